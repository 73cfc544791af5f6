//! Creation specs - the declared shape of a required resource.
//!
//! A [`CreationSpec`] wraps a nested [`SpecValue`] tree as declared by
//! the caller. Materializing walks the tree, preserving shape and key
//! order, and resolves every lazy leaf just before the builder's
//! create operation runs.

use serde_json::Value as Json;

use crate::error::Result;
use crate::value::SpecValue;

/// The declared spec of a required resource.
#[derive(Debug, Clone)]
pub struct CreationSpec {
    root: SpecValue,
}

impl CreationSpec {
    /// Wrap a raw spec tree.
    pub fn new(root: SpecValue) -> Self {
        Self { root }
    }

    /// The underlying spec tree.
    pub fn root(&self) -> &SpecValue {
        &self.root
    }

    /// Resolve every lazy value to a concrete JSON document.
    ///
    /// Fails with an unresolved-reference error if any leaf references
    /// a future that has not resolved.
    pub fn materialize(&self) -> Result<Json> {
        self.root.materialize()
    }
}

impl From<SpecValue> for CreationSpec {
    fn from(root: SpecValue) -> Self {
        Self::new(root)
    }
}

impl From<CreationSpec> for SpecValue {
    fn from(spec: CreationSpec) -> Self {
        spec.root
    }
}

/// Declare a resource spec as an ordered mapping.
///
/// Values are anything convertible to [`SpecValue`]: scalars, JSON,
/// forward references obtained from [`Future::get`](crate::Future::get),
/// sums of those, nested `spec!` mappings, or `Vec<SpecValue>` lists.
///
/// ```
/// use reconcile::spec;
///
/// let spec = spec! {
///     "name": "web-1",
///     "region": "fra1",
/// };
/// ```
#[macro_export]
macro_rules! spec {
    () => {
        $crate::SpecValue::Map(Vec::new())
    };
    ($($key:literal : $value:expr),+ $(,)?) => {
        $crate::SpecValue::Map(vec![
            $(($key.to_string(), $crate::SpecValue::from($value))),+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Future;
    use serde_json::json;

    #[test]
    fn test_materialize_preserves_shape_and_key_order() {
        let spec = CreationSpec::from(spec! {
            "name": "web-1",
            "region": "fra1",
            "networking": spec! {
                "ipv6": true,
                "firewall": "strict",
            },
            "tags": vec![SpecValue::from("web"), SpecValue::from("prod")],
        });
        let materialized = spec.materialize().unwrap();
        assert_eq!(
            materialized,
            json!({
                "name": "web-1",
                "region": "fra1",
                "networking": {"ipv6": true, "firewall": "strict"},
                "tags": ["web", "prod"],
            })
        );
        let keys: Vec<&String> = materialized.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "region", "networking", "tags"]);
    }

    #[test]
    fn test_materialize_resolves_embedded_references() {
        let vpc = Future::new();
        let spec = CreationSpec::from(spec! {
            "name": "web-1",
            "vpc_uuid": vpc.get("id"),
        });
        vpc.populate(json!({"id": "vpc-1234"})).unwrap();
        assert_eq!(
            spec.materialize().unwrap(),
            json!({"name": "web-1", "vpc_uuid": "vpc-1234"})
        );
    }

    #[test]
    fn test_materialize_fails_on_unresolved_reference() {
        let vpc = Future::new();
        let spec = CreationSpec::from(spec! {
            "name": "web-1",
            "vpc_uuid": vpc.get("id"),
        });
        assert!(spec.materialize().is_err());
    }

    #[test]
    fn test_empty_spec_materializes_to_empty_object() {
        let spec = CreationSpec::from(spec! {});
        assert_eq!(spec.materialize().unwrap(), json!({}));
    }
}
