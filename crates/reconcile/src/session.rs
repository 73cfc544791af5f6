//! Session controller - sequences the apply protocol.
//!
//! A session collects declarations without making any remote call, then
//! converges on close: fetch existing resources per builder, diff each
//! declaration in registration order, create what is missing, poll
//! asynchronous creations to completion, and finally delete whatever
//! existed remotely but was not redeclared.

use std::mem;
use std::time::Duration;

use serde_json::Value as Json;

use crate::builder::{Created, Poller, ResourceBuilder};
use crate::diff::Categorized;
use crate::error::Result;
use crate::observe::{Clock, LogObserver, SessionObserver, SystemClock};
use crate::spec::CreationSpec;
use crate::value::Future;

/// Handle to a builder registered with a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderId(usize);

/// One declaration: a required resource bound to a builder, with the
/// future that will carry its final spec.
#[derive(Debug)]
struct Declaration {
    builder: usize,
    spec: CreationSpec,
    future: Future,
}

/// A creation accepted but not yet complete. Carries the materialized
/// request so later identical declarations can attach to it, and every
/// future awaiting the final spec.
struct PendingCreation {
    builder: usize,
    request: Json,
    poller: Poller,
    futures: Vec<Future>,
}

/// Configuration injected into a session.
///
/// The controller carries no ambient state: pacing and diagnostics are
/// both supplied here.
pub struct SessionConfig {
    /// Pause between poll sweeps while creations are pending.
    pub poll_interval: Duration,
    /// Clock used to wait out the poll interval.
    pub clock: Box<dyn Clock>,
    /// Sink for progress notifications.
    pub observer: Box<dyn SessionObserver>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            clock: Box::new(SystemClock),
            observer: Box::new(LogObserver),
        }
    }
}

/// A scoped reconciliation session.
///
/// Declarations are recorded in order and nothing touches the remote
/// system until [`apply`](Self::apply) runs. Dropping a session without
/// applying it discards the declarations - the error path of
/// [`run`](Self::run) relies on exactly that.
#[derive(Default)]
pub struct Session {
    builders: Vec<Box<dyn ResourceBuilder>>,
    declarations: Vec<Declaration>,
    config: SessionConfig,
}

impl Session {
    /// Create a session with default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create a session with explicit pacing and diagnostics.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            builders: Vec::new(),
            declarations: Vec::new(),
            config,
        }
    }

    /// Register a resource builder, returning a handle to declare with.
    ///
    /// The same builder type may be registered more than once; each
    /// registration gets its own pool of existing resources.
    pub fn register(&mut self, builder: impl ResourceBuilder + 'static) -> BuilderId {
        self.builders.push(Box::new(builder));
        BuilderId(self.builders.len() - 1)
    }

    /// Declare a required resource.
    ///
    /// Returns a fresh unpopulated future immediately; no remote call
    /// happens at declaration time.
    pub fn declare(&mut self, builder: BuilderId, spec: impl Into<CreationSpec>) -> Future {
        let future = Future::new();
        self.declarations.push(Declaration {
            builder: builder.0,
            spec: spec.into(),
            future: future.clone(),
        });
        future
    }

    /// Run a declaration block and apply on success.
    ///
    /// If the block fails, apply does not run: nothing is created or
    /// deleted and the block's error propagates unchanged.
    pub fn run<T, F>(block: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> anyhow::Result<T>,
    {
        Self::run_with(SessionConfig::default(), block)
    }

    /// [`run`](Self::run) with explicit configuration.
    pub fn run_with<T, F>(config: SessionConfig, block: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> anyhow::Result<T>,
    {
        let mut session = Session::with_config(config);
        let value = block(&mut session)?;
        session.apply()?;
        Ok(value)
    }

    /// Converge the remote system to the declared state.
    ///
    /// Runs the full protocol: fetch pools, categorize and create in
    /// declaration order, poll pending creations to completion, then
    /// delete unmatched leftovers per builder. Any failure aborts the
    /// remaining protocol; a partially converged remote state is
    /// recovered by rerunning the same declarations.
    pub fn apply(self) -> Result<()> {
        let Self {
            builders,
            declarations,
            config,
        } = self;
        let SessionConfig {
            poll_interval,
            clock,
            mut observer,
        } = config;

        // Step 1: one existing-resources fetch per builder, in
        // registration order. These seed the remaining pools.
        let mut pools: Vec<Vec<Json>> = Vec::with_capacity(builders.len());
        for builder in &builders {
            let existing = builder.existing_resources()?;
            observer.on_existing_fetched(builder.kind(), existing.len());
            pools.push(existing);
        }

        // Specs already matched or created this session, per builder.
        // A declaration identical to an earlier one reuses its result
        // instead of creating again.
        let mut session_specs: Vec<Vec<Json>> = vec![Vec::new(); builders.len()];
        let mut pending: Vec<PendingCreation> = Vec::new();

        // Step 2: categorize and create, interleaved exactly as declared.
        for declaration in &declarations {
            let slot = declaration.builder;
            let builder = &builders[slot];

            if let Categorized::Existing { spec, .. } =
                builder.categorize(&declaration.spec, session_specs[slot].clone())
            {
                observer.on_resource_matched(builder.kind());
                declaration.future.populate(spec)?;
                continue;
            }

            // A duplicate of a creation still in flight waits on the
            // same poller instead of creating again.
            if let Some(creation) = pending
                .iter_mut()
                .filter(|creation| creation.builder == slot)
                .find(|creation| {
                    matches!(
                        builder.categorize(&declaration.spec, vec![creation.request.clone()]),
                        Categorized::Existing { .. }
                    )
                })
            {
                observer.on_creation_pending(builder.kind());
                creation.futures.push(declaration.future.clone());
                continue;
            }

            match builder.categorize(&declaration.spec, mem::take(&mut pools[slot])) {
                Categorized::Existing { spec, remaining } => {
                    pools[slot] = remaining;
                    observer.on_resource_matched(builder.kind());
                    declaration.future.populate(spec.clone())?;
                    session_specs[slot].push(spec);
                }
                Categorized::ToCreate { spec, remaining } => {
                    pools[slot] = remaining;
                    let materialized = spec.materialize()?;
                    match builder.create_resource(materialized.clone())? {
                        Created::Ready(final_spec) => {
                            observer.on_resource_created(builder.kind());
                            declaration.future.populate(final_spec.clone())?;
                            session_specs[slot].push(final_spec);
                        }
                        Created::Pending(poller) => {
                            observer.on_creation_pending(builder.kind());
                            pending.push(PendingCreation {
                                builder: slot,
                                request: materialized,
                                poller,
                                futures: vec![declaration.future.clone()],
                            });
                        }
                    }
                }
            }
        }

        // Step 3: sweep pending creations in stable order until none
        // remain. Give-up belongs to the pollers; the controller only
        // paces the sweeps.
        while !pending.is_empty() {
            let mut still_pending = Vec::with_capacity(pending.len());
            for mut creation in pending {
                match creation.poller.poll()? {
                    Some(final_spec) => {
                        observer.on_resource_created(builders[creation.builder].kind());
                        for future in &creation.futures {
                            future.populate(final_spec.clone())?;
                        }
                        session_specs[creation.builder].push(final_spec);
                    }
                    None => still_pending.push(creation),
                }
            }
            pending = still_pending;
            if !pending.is_empty() {
                observer.on_poll_sweep(pending.len());
                clock.pause(poll_interval);
            }
        }

        // Step 5: whatever is left in a pool was not redeclared this
        // session; delete it in one batch per builder, only now that
        // every creation has completed. The observer hears about a
        // deletion only once the builder's call has succeeded.
        for (slot, builder) in builders.iter().enumerate() {
            let leftovers = mem::take(&mut pools[slot]);
            let count = leftovers.len();
            builder.delete_resources(leftovers)?;
            observer.on_resources_deleted(builder.kind(), count);
        }

        Ok(())
    }
}
