//! # Reconcile
//!
//! A framework for declarative remote-resource reconciliation.
//!
//! Callers declare the resources they require inside a scoped session;
//! on close the engine diffs the declarations against what already
//! exists remotely, creates what is missing, reuses what matches, and
//! deletes whatever was not redeclared. Re-running the same
//! declarations converges to the same resource set.
//!
//! ## Core Concepts
//!
//! - **Session**: scoped controller sequencing declare, diff, create,
//!   poll, and delete
//! - **ResourceBuilder**: per-resource-type adapter (enumerate, match,
//!   create, delete)
//! - **Future**: write-once cell for the spec a declared resource will
//!   eventually have
//! - **SpecValue / CreationSpec**: declared spec trees whose leaves may
//!   reference not-yet-known attributes of other declarations
//! - **Poller**: resumable completion check for creations that finish
//!   asynchronously server-side
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{Session, spec};
//!
//! let (server, network) = Session::run(|session| {
//!     let networks = session.register(network_builder);
//!     let servers = session.register(server_builder);
//!
//!     let network = session.declare(networks, spec! {"name": "edge"});
//!     let server = session.declare(servers, spec! {
//!         "name": "web-1",
//!         "network_id": network.get("id"),
//!     });
//!     Ok((server, network))
//! })?;
//!
//! // Both futures are populated once the session closes.
//! assert!(server.is_resolved());
//! ```
//!
//! ## Scheduling model
//!
//! Strictly single-threaded and synchronous. Asynchronous creation is a
//! value (a [`Poller`]) the session actively re-invokes; there are no
//! callbacks and no background execution. Declarations are diffed and
//! created in registration order, interleaved exactly as declared
//! across builders.
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`ResourceBuilder`]: concrete per-resource-type behavior
//! - [`SessionObserver`]: receives progress updates
//! - [`Clock`]: paces the polling loop
//!
//! This allows the engine to be used without hard dependencies on a
//! specific transport, logger, or time source.

pub mod builder;
pub mod diff;
pub mod error;
pub mod observe;
pub mod session;
pub mod spec;
pub mod value;

// Re-export main types at crate root
pub use builder::{Created, Poller, ResourceBuilder};
pub use diff::{Categorized, categorize_by_key, categorize_structural, is_structural_subset};
pub use error::{Error, Result};
pub use observe::{Clock, LogObserver, NoSleep, NoopObserver, SessionObserver, SystemClock};
pub use session::{BuilderId, Session, SessionConfig};
pub use spec::CreationSpec;
pub use value::{Future, FutureRef, SpecValue};
