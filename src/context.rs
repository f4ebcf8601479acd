//! # Task-facing context.
//!
//! The [`Context`] is the handle a running task uses to talk back to its
//! runner: announce readiness, observe the halt request, and surface
//! non-fatal errors. It is handed to [`Runnable::run`](crate::Runnable::run)
//! and is cheap to clone into helper tasks.
//!
//! The typical shape of a service body:
//!
//! ```
//! use servisor::{Context, Error};
//!
//! async fn run(ctx: Context) -> Result<(), Error> {
//!     ctx.ready()?;
//!     loop {
//!         tokio::select! {
//!             _ = ctx.done() => return Ok(()),
//!             // ... other branches doing the actual work ...
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::record::ServiceRecord;
use crate::runner::RunnerInner;
use crate::service::Name;
use crate::state::State;

/// Handle a running task uses to interact with its runner.
#[derive(Clone)]
pub struct Context {
    record: Arc<ServiceRecord>,
    runner: Arc<RunnerInner>,
}

impl Context {
    pub(crate) fn new(record: Arc<ServiceRecord>, runner: Arc<RunnerInner>) -> Self {
        Self { record, runner }
    }

    /// Signals that the service has finished starting up.
    ///
    /// MUST be called exactly once, before the task enters its steady
    /// state. Unblocks the caller waiting in
    /// [`Runner::start`](crate::Runner::start).
    ///
    /// Returns [`Error::Canceled`] if the runner is already halting the
    /// service (the task should wind down and return that error), and a
    /// state error if readiness was already signaled.
    pub fn ready(&self) -> Result<(), Error> {
        let ready = self.record.begin_ready()?;
        if let Some(signal) = ready {
            signal.done(None);
        }
        self.runner
            .raise_on_state(self.record.service(), State::Starting, State::Started);
        Ok(())
    }

    /// Resolves when the service is asked to halt.
    ///
    /// Cancel-safe; meant for `select!` loops.
    pub async fn done(&self) {
        self.record.token().cancelled().await
    }

    /// Non-blocking form of [`done`](Context::done).
    pub fn should_halt(&self) -> bool {
        self.record.token().is_cancelled()
    }

    /// Forwards a non-fatal error to the runner's
    /// [`ErrorListener`](crate::ErrorListener) without ending the service.
    pub fn on_error(&self, err: Error) {
        self.runner.raise_on_error(self.record.service(), err);
    }

    /// A child token that is cancelled when the service is halted, for
    /// composing with other tokio primitives.
    pub fn child_token(&self) -> CancellationToken {
        self.record.token().child_token()
    }

    /// Display name of the service.
    pub fn name(&self) -> &Name {
        self.record.service().name()
    }

    /// Unique monotonic id of this run, assigned by the runner.
    pub fn id(&self) -> u64 {
        self.record.id()
    }
}
