//! # Lifecycle listeners.
//!
//! Three single-method traits hook into the service lifecycle:
//!
//! - [`EndListener`]: fired exactly once per run, after the record has been
//!   removed from the registry. `err` is `None` for a halted service and
//!   carries the failure otherwise.
//! - [`StateListener`]: fired on every state transition.
//! - [`ErrorListener`]: the side channel behind
//!   [`Context::on_error`](crate::Context::on_error) for non-fatal errors a
//!   task surfaces without ending.
//!
//! Global listeners are frozen at [`RunnerBuilder::build`](crate::RunnerBuilder::build)
//! and are read without synchronization afterwards. Per-service listeners
//! ride on the [`Service`] descriptor.
//!
//! ## Rules
//! - Every invocation happens on a dedicated worker; the runner never
//!   blocks on listener code, and listener code may call back into the
//!   runner (including `start`/`halt` of the same descriptor).
//! - Invocations may be observed out of order relative to one another and
//!   relative to the caller's return from `start`/`halt`.
//!
//! Plain closures with matching signatures implement the traits, so
//! hooking a channel or a log line in does not require a named type.

use crate::error::Error;
use crate::service::Service;
use crate::state::{Stage, State};

/// Receives the end-of-life notification of a service.
pub trait EndListener: Send + Sync + 'static {
    fn on_end(&self, stage: Stage, service: &Service, err: Option<&Error>);
}

/// Receives every state transition of a service.
pub trait StateListener: Send + Sync + 'static {
    fn on_state(&self, service: &Service, from: State, to: State);
}

/// Receives non-fatal errors surfaced by a running task.
pub trait ErrorListener: Send + Sync + 'static {
    fn on_error(&self, service: &Service, err: &Error);
}

impl<F> EndListener for F
where
    F: Fn(Stage, &Service, Option<&Error>) + Send + Sync + 'static,
{
    fn on_end(&self, stage: Stage, service: &Service, err: Option<&Error>) {
        self(stage, service, err)
    }
}

impl<F> StateListener for F
where
    F: Fn(&Service, State, State) + Send + Sync + 'static,
{
    fn on_state(&self, service: &Service, from: State, to: State) {
        self(service, from, to)
    }
}

impl<F> ErrorListener for F
where
    F: Fn(&Service, &Error) + Send + Sync + 'static,
{
    fn on_error(&self, service: &Service, err: &Error) {
        self(service, err)
    }
}

/// Simple built-in listener that prints lifecycle events.
///
/// Demo/reference only; enable with `--features logging`.
#[cfg(feature = "logging")]
pub struct LogListener;

#[cfg(feature = "logging")]
impl EndListener for LogListener {
    fn on_end(&self, stage: Stage, service: &Service, err: Option<&Error>) {
        match err {
            Some(err) => println!("[end] service={} stage={stage} err={err}", service.name()),
            None => println!("[end] service={} stage={stage}", service.name()),
        }
    }
}

#[cfg(feature = "logging")]
impl StateListener for LogListener {
    fn on_state(&self, service: &Service, from: State, to: State) {
        println!("[state] service={} {from}->{to}", service.name());
    }
}

#[cfg(feature = "logging")]
impl ErrorListener for LogListener {
    fn on_error(&self, service: &Service, err: &Error) {
        println!("[error] service={} err={err}", service.name());
    }
}
