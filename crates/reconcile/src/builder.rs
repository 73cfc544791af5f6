//! Resource builder contract - per-resource-type behavior.
//!
//! A builder knows how to enumerate, match, create, and delete one kind
//! of remote resource. The session controller is polymorphic over this
//! trait and never talks to the remote system itself.

use std::fmt;

use anyhow::Result;
use serde_json::Value as Json;

use crate::diff::{Categorized, categorize_structural};
use crate::spec::CreationSpec;

/// Per-resource-type adapter the session controller drives.
///
/// One instance per resource kind. Builders own the transport they need;
/// the controller only sequences the calls.
pub trait ResourceBuilder {
    /// Short resource-kind label, used for diagnostics.
    fn kind(&self) -> &str;

    /// Enumerate the resources that currently exist remotely.
    ///
    /// Called exactly once per session; the result seeds the builder's
    /// remaining pool.
    fn existing_resources(&self) -> Result<Vec<Json>>;

    /// Diff one required spec against the remaining pool.
    ///
    /// The default takes the first structural-superset match; override
    /// to rename fields, scope the match, or key on a single attribute.
    fn categorize(&self, required: &CreationSpec, existing: Vec<Json>) -> Categorized {
        categorize_structural(required, existing)
    }

    /// Create the resource from a fully materialized spec.
    ///
    /// Returns the final spec when creation completes synchronously, or
    /// a [`Poller`] when the remote side finishes asynchronously.
    fn create_resource(&self, spec: Json) -> Result<Created>;

    /// Delete the leftover batch - existing resources no declaration
    /// matched this session. Called once per session; must be a no-op
    /// on an empty batch.
    fn delete_resources(&self, specs: Vec<Json>) -> Result<()>;
}

/// Outcome of a builder's create operation.
pub enum Created {
    /// Creation finished; here is the final spec.
    Ready(Json),
    /// Creation was accepted but is still in progress server-side.
    Pending(Poller),
}

impl fmt::Debug for Created {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(spec) => write!(f, "Created::Ready({spec})"),
            Self::Pending(_) => write!(f, "Created::Pending"),
        }
    }
}

/// Resumable completion check for an asynchronous creation.
///
/// The session controller re-invokes [`poll`](Self::poll) each sweep
/// until it yields the final spec. Pacing between sweeps belongs to the
/// controller's clock; giving up belongs to the check itself, which
/// signals it by returning an error.
pub struct Poller {
    check: Box<dyn FnMut() -> Result<Option<Json>>>,
}

impl Poller {
    /// Wrap a zero-argument readiness check.
    pub fn new(check: impl FnMut() -> Result<Option<Json>> + 'static) -> Self {
        Self {
            check: Box::new(check),
        }
    }

    /// Ask the remote side whether creation has finished.
    ///
    /// `None` means still pending; `Some(spec)` is the final spec.
    pub fn poll(&mut self) -> Result<Option<Json>> {
        (self.check)()
    }
}

impl fmt::Debug for Poller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Poller")
    }
}
