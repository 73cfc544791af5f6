//! Observer and clock traits - injected diagnostics and pacing.
//!
//! The controller never touches ambient global state: progress goes to
//! an injected [`SessionObserver`] and pacing between poll sweeps goes
//! through an injected [`Clock`].

use std::time::Duration;

/// Receives progress notifications while a session applies.
pub trait SessionObserver {
    /// Existing resources were fetched for a builder.
    fn on_existing_fetched(&mut self, kind: &str, count: usize);

    /// A declaration matched an existing resource; nothing was created.
    fn on_resource_matched(&mut self, kind: &str);

    /// A resource was created and its final spec is known.
    fn on_resource_created(&mut self, kind: &str);

    /// A creation was accepted but is still completing server-side.
    fn on_creation_pending(&mut self, kind: &str);

    /// A poll sweep finished with creations still pending.
    fn on_poll_sweep(&mut self, still_pending: usize);

    /// A builder's delete operation finished for the leftover batch.
    fn on_resources_deleted(&mut self, kind: &str, count: usize);
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_existing_fetched(&mut self, _kind: &str, _count: usize) {}
    fn on_resource_matched(&mut self, _kind: &str) {}
    fn on_resource_created(&mut self, _kind: &str) {}
    fn on_creation_pending(&mut self, _kind: &str) {}
    fn on_poll_sweep(&mut self, _still_pending: usize) {}
    fn on_resources_deleted(&mut self, _kind: &str, _count: usize) {}
}

/// Observer that forwards progress to the `log` facade.
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_existing_fetched(&mut self, kind: &str, count: usize) {
        log::debug!("fetched {count} existing {kind} resource(s)");
    }

    fn on_resource_matched(&mut self, kind: &str) {
        log::debug!("reusing existing {kind} resource");
    }

    fn on_resource_created(&mut self, kind: &str) {
        log::info!("created {kind} resource");
    }

    fn on_creation_pending(&mut self, kind: &str) {
        log::debug!("{kind} creation accepted, waiting for completion");
    }

    fn on_poll_sweep(&mut self, still_pending: usize) {
        log::debug!("{still_pending} creation(s) still pending");
    }

    fn on_resources_deleted(&mut self, kind: &str, count: usize) {
        if count > 0 {
            log::info!("deleted {count} leftover {kind} resource(s)");
        }
    }
}

/// Pacing between poll sweeps.
pub trait Clock {
    /// Wait out one poll interval.
    fn pause(&self, interval: Duration);
}

/// Clock backed by [`std::thread::sleep`].
pub struct SystemClock;

impl Clock for SystemClock {
    fn pause(&self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Clock that never sleeps, for tests and tight polling loops.
pub struct NoSleep;

impl Clock for NoSleep {
    fn pause(&self, _interval: Duration) {}
}
