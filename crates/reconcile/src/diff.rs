//! Categorization of declared specs against existing remote resources.
//!
//! The generic shape: scan the remaining pool in order and take the
//! first entry that is a structural superset of the required spec.
//! Builders may use [`categorize_structural`] directly, narrow the
//! match to a single key with [`categorize_by_key`], or implement
//! their own matching entirely.

use serde_json::Value as Json;

use crate::spec::CreationSpec;
use crate::value::SpecValue;

/// Outcome of diffing one declaration against the remaining pool.
#[derive(Debug)]
pub enum Categorized {
    /// A matching resource already exists remotely.
    Existing {
        /// The matched existing spec.
        spec: Json,
        /// The pool with the matched entry removed.
        remaining: Vec<Json>,
    },
    /// No existing resource matches; the resource must be created.
    ToCreate {
        /// The declared spec, still unmaterialized.
        spec: CreationSpec,
        /// The untouched pool.
        remaining: Vec<Json>,
    },
}

/// Whether an existing spec is a structural superset of the required one.
///
/// Every key in the required mapping must equal the corresponding key in
/// the existing spec, recursively for nested mappings. Lazy leaves that
/// cannot materialize yet never match.
pub fn is_structural_subset(required: &SpecValue, existing: &Json) -> bool {
    match required {
        SpecValue::Map(entries) => {
            let Some(object) = existing.as_object() else {
                return false;
            };
            entries.iter().all(|(key, value)| {
                object
                    .get(key)
                    .is_some_and(|existing_value| is_structural_subset(value, existing_value))
            })
        }
        leaf => leaf
            .materialize()
            .is_ok_and(|value| value == *existing),
    }
}

/// Categorize by first structural-superset match, ties to the earliest index.
pub fn categorize_structural(required: &CreationSpec, mut existing: Vec<Json>) -> Categorized {
    match existing
        .iter()
        .position(|candidate| is_structural_subset(required.root(), candidate))
    {
        Some(index) => {
            let spec = existing.remove(index);
            Categorized::Existing {
                spec,
                remaining: existing,
            }
        }
        None => Categorized::ToCreate {
            spec: required.clone(),
            remaining: existing,
        },
    }
}

/// Categorize by equality of a single key, ties to the earliest index.
///
/// Useful where existing specs carry far more fields than declarations
/// do (server-assigned ids, timestamps) and one key identifies the
/// resource. A required spec without the key, or whose key cannot
/// materialize yet, never matches.
pub fn categorize_by_key(required: &CreationSpec, mut existing: Vec<Json>, key: &str) -> Categorized {
    let required_value = match required.root() {
        SpecValue::Map(entries) => entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .and_then(|(_, value)| value.materialize().ok()),
        _ => None,
    };

    let found = required_value.and_then(|value| {
        existing
            .iter()
            .position(|candidate| candidate.get(key) == Some(&value))
    });

    match found {
        Some(index) => {
            let spec = existing.remove(index);
            Categorized::Existing {
                spec,
                remaining: existing,
            }
        }
        None => Categorized::ToCreate {
            spec: required.clone(),
            remaining: existing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec;
    use crate::value::Future;
    use serde_json::json;

    #[test]
    fn test_structural_subset_matches_superset() {
        let required = spec! {"name": "d1"};
        assert!(is_structural_subset(
            &required,
            &json!({"name": "d1", "id": 7, "region": "fra1"})
        ));
    }

    #[test]
    fn test_structural_subset_recurses_into_mappings() {
        let required = spec! {"name": "d1", "image": spec! {"name": "debian-12"}};
        assert!(is_structural_subset(
            &required,
            &json!({"name": "d1", "image": {"name": "debian-12", "id": 3}})
        ));
        assert!(!is_structural_subset(
            &required,
            &json!({"name": "d1", "image": {"name": "debian-11"}})
        ));
    }

    #[test]
    fn test_structural_subset_rejects_missing_key() {
        let required = spec! {"name": "d1", "size": "s-1vcpu-1gb"};
        assert!(!is_structural_subset(&required, &json!({"name": "d1"})));
    }

    #[test]
    fn test_unmaterializable_leaf_never_matches() {
        let other = Future::new();
        let required = spec! {"name": other.get("name")};
        assert!(!is_structural_subset(&required, &json!({"name": "d1"})));
    }

    #[test]
    fn test_categorize_structural_takes_earliest_match() {
        let required = CreationSpec::from(spec! {"name": "d1"});
        let existing = vec![
            json!({"name": "d0", "id": 1}),
            json!({"name": "d1", "id": 2}),
            json!({"name": "d1", "id": 3}),
        ];
        match categorize_structural(&required, existing) {
            Categorized::Existing { spec, remaining } => {
                assert_eq!(spec, json!({"name": "d1", "id": 2}));
                assert_eq!(remaining.len(), 2);
                assert_eq!(remaining[0], json!({"name": "d0", "id": 1}));
            }
            Categorized::ToCreate { .. } => panic!("expected an existing match"),
        }
    }

    #[test]
    fn test_categorize_structural_without_match_keeps_pool() {
        let required = CreationSpec::from(spec! {"name": "d9"});
        let existing = vec![json!({"name": "d0"}), json!({"name": "d1"})];
        match categorize_structural(&required, existing) {
            Categorized::ToCreate { remaining, .. } => assert_eq!(remaining.len(), 2),
            Categorized::Existing { .. } => panic!("expected no match"),
        }
    }

    #[test]
    fn test_categorize_by_key_ignores_other_fields() {
        let required = CreationSpec::from(spec! {"name": "d1", "size": "s-1vcpu-1gb"});
        let existing = vec![json!({"name": "d1", "id": 2, "size": "s-2vcpu-4gb"})];
        match categorize_by_key(&required, existing, "name") {
            Categorized::Existing { spec, remaining } => {
                assert_eq!(spec["id"], 2);
                assert!(remaining.is_empty());
            }
            Categorized::ToCreate { .. } => panic!("expected an existing match"),
        }
    }

    #[test]
    fn test_categorize_by_key_without_key_creates() {
        let required = CreationSpec::from(spec! {"region": "fra1"});
        let existing = vec![json!({"name": "d1"})];
        assert!(matches!(
            categorize_by_key(&required, existing, "name"),
            Categorized::ToCreate { .. }
        ));
    }

    #[test]
    fn test_pool_shrinks_by_at_most_one() {
        let required = CreationSpec::from(spec! {"name": "d1"});
        let existing = vec![json!({"name": "d1"}), json!({"name": "d1"})];
        match categorize_structural(&required, existing) {
            Categorized::Existing { remaining, .. } => assert_eq!(remaining.len(), 1),
            Categorized::ToCreate { .. } => panic!("expected an existing match"),
        }
    }
}
