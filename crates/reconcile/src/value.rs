//! Lazy value system: futures, forward references, and deferred sums.
//!
//! A [`Future`] is a write-once cell for the spec a resource will
//! eventually have. Reading an attribute before the future resolves
//! hands back a [`FutureRef`] instead of failing, so one declaration
//! can name a value of another that is only known once the earlier
//! declaration has been created or matched remotely.
//!
//! Resolution is pull-based: nothing is notified when a future
//! populates. References are materialized when the session needs the
//! concrete value, and a reference resolves in exactly one hop - a
//! chain of unresolved references is a hard failure, never chased.

use std::cell::RefCell;
use std::fmt;
use std::ops::Add;
use std::rc::Rc;

use serde_json::Value as Json;

use crate::error::{Error, Result};

/// Write-once cell for a resource's eventual spec.
///
/// Handles are cheap to clone and share one underlying cell; the
/// session controller populates it once the resource is matched or
/// created. Attribute access before population returns a
/// [`SpecValue::Reference`] rather than an error.
#[derive(Clone, Default)]
pub struct Future {
    inner: Rc<RefCell<FutureCell>>,
}

#[derive(Default)]
struct FutureCell {
    resolved: Option<Json>,
    /// Attributes requested before resolution, kept for introspection.
    requested: Vec<String>,
}

impl Future {
    /// Create a fresh unpopulated future.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the future has been populated.
    pub fn is_resolved(&self) -> bool {
        self.inner.borrow().resolved.is_some()
    }

    /// The resolved spec, if the session has populated this future.
    pub fn resolved_spec(&self) -> Option<Json> {
        self.inner.borrow().resolved.clone()
    }

    /// Attribute names that were requested before the future resolved.
    pub fn requested_attributes(&self) -> Vec<String> {
        self.inner.borrow().requested.clone()
    }

    /// Read an attribute of the eventual spec.
    ///
    /// Returns the concrete value if the future is populated and carries
    /// the attribute; otherwise a forward reference that materializes
    /// later.
    pub fn get(&self, attribute: &str) -> SpecValue {
        let mut cell = self.inner.borrow_mut();
        if let Some(spec) = &cell.resolved
            && let Some(value) = spec.get(attribute)
        {
            return SpecValue::Concrete(value.clone());
        }
        cell.requested.push(attribute.to_string());
        drop(cell);
        SpecValue::Reference(FutureRef {
            future: self.clone(),
            attribute: attribute.to_string(),
        })
    }

    /// Populate the future with its final spec.
    ///
    /// Populating twice with an equal spec is a no-op; a differing spec
    /// is an internal-consistency violation.
    pub(crate) fn populate(&self, spec: Json) -> Result<()> {
        let mut cell = self.inner.borrow_mut();
        match &cell.resolved {
            Some(previous) if *previous == spec => Ok(()),
            Some(previous) => Err(Error::InternalConsistency {
                previous: previous.clone(),
                conflicting: spec,
            }),
            None => {
                cell.resolved = Some(spec);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.borrow().resolved {
            Some(spec) => write!(f, "Future(resolved: {spec})"),
            None => write!(f, "Future(unresolved)"),
        }
    }
}

/// Deferred attribute read against a [`Future`].
///
/// Immutable once created; materializing reads the attribute from the
/// resolved spec or fails if the future has not resolved yet.
#[derive(Debug, Clone)]
pub struct FutureRef {
    future: Future,
    attribute: String,
}

impl FutureRef {
    /// The attribute this reference reads.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Resolve the reference to a concrete value, in a single hop.
    pub fn materialize(&self) -> Result<Json> {
        match self.future.resolved_spec() {
            None => Err(Error::UnresolvedReference {
                attribute: self.attribute.clone(),
            }),
            Some(spec) => spec
                .get(&self.attribute)
                .cloned()
                .ok_or_else(|| Error::MissingAttribute {
                    attribute: self.attribute.clone(),
                }),
        }
    }
}

/// A value inside a creation spec.
///
/// Leaves are either concrete JSON or lazy (references and sums);
/// maps and lists preserve shape and ordering through materialization.
#[derive(Debug, Clone)]
pub enum SpecValue {
    /// A concrete value, materializing to itself.
    Concrete(Json),
    /// A deferred attribute read.
    Reference(FutureRef),
    /// Deferred concatenation of materializable operands, left to right.
    Sum(Vec<SpecValue>),
    /// Nested mapping, insertion-ordered.
    Map(Vec<(String, SpecValue)>),
    /// Nested sequence.
    List(Vec<SpecValue>),
}

impl SpecValue {
    /// Resolve every lazy leaf to a concrete JSON value.
    pub fn materialize(&self) -> Result<Json> {
        match self {
            Self::Concrete(value) => Ok(value.clone()),
            Self::Reference(reference) => reference.materialize(),
            Self::Sum(operands) => {
                let mut joined = String::new();
                for operand in operands {
                    match operand.materialize()? {
                        Json::String(part) => joined.push_str(&part),
                        other => return Err(Error::NotConcatenable { value: other }),
                    }
                }
                Ok(Json::String(joined))
            }
            Self::Map(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.materialize()?);
                }
                Ok(Json::Object(map))
            }
            Self::List(items) => Ok(Json::Array(
                items
                    .iter()
                    .map(Self::materialize)
                    .collect::<Result<Vec<_>>>()?,
            )),
        }
    }
}

// Sums compose by appending further operands.
impl<T: Into<SpecValue>> Add<T> for SpecValue {
    type Output = SpecValue;

    fn add(self, rhs: T) -> SpecValue {
        match self {
            SpecValue::Sum(mut operands) => {
                operands.push(rhs.into());
                SpecValue::Sum(operands)
            }
            other => SpecValue::Sum(vec![other, rhs.into()]),
        }
    }
}

impl From<FutureRef> for SpecValue {
    fn from(reference: FutureRef) -> Self {
        Self::Reference(reference)
    }
}

impl From<Json> for SpecValue {
    fn from(value: Json) -> Self {
        Self::Concrete(value)
    }
}

impl From<&str> for SpecValue {
    fn from(value: &str) -> Self {
        Self::Concrete(Json::String(value.to_string()))
    }
}

impl From<String> for SpecValue {
    fn from(value: String) -> Self {
        Self::Concrete(Json::String(value))
    }
}

impl From<bool> for SpecValue {
    fn from(value: bool) -> Self {
        Self::Concrete(Json::Bool(value))
    }
}

impl From<i64> for SpecValue {
    fn from(value: i64) -> Self {
        Self::Concrete(Json::from(value))
    }
}

impl From<u64> for SpecValue {
    fn from(value: u64) -> Self {
        Self::Concrete(Json::from(value))
    }
}

impl From<i32> for SpecValue {
    fn from(value: i32) -> Self {
        Self::Concrete(Json::from(value))
    }
}

impl From<f64> for SpecValue {
    fn from(value: f64) -> Self {
        Self::Concrete(Json::from(value))
    }
}

impl From<Vec<SpecValue>> for SpecValue {
    fn from(items: Vec<SpecValue>) -> Self {
        Self::List(items)
    }
}
