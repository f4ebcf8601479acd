//! # Error types for the runner and for services.
//!
//! One crate-level [`Error`] enum covers both sides of the boundary:
//! orchestration failures raised by the [`Runner`](crate::Runner)
//! (`NotEnabled`, `AlreadyRunning`, timeouts, illegal state transitions)
//! and failures returned by service tasks themselves (`Failed`, `Ended`,
//! `Canceled`).
//!
//! Callers classify errors by kind through predicates, never by matching
//! display strings: [`Error::is_wait_timeout`], [`Error::is_halt_timeout`],
//! [`Error::is_service_unknown`], [`Error::is_not_running`]. The predicates
//! look through [`Error::Service`] wrappers and single-entry aggregates via
//! [`Error::cause`], so a wrapped timeout still answers `true`.
//!
//! Batch operations collect every per-service error into
//! [`Error::Aggregate`]; one successful service never suppresses a
//! sibling's failure. [`Error::errors`] exposes the individual entries.

use std::time::Duration;

use thiserror::Error;

use crate::service::Name;
use crate::state::State;

/// Errors produced by the runner and by supervised services.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The runner is suspended or shut down and rejects new starts.
    #[error("runner is not enabled")]
    NotEnabled,

    /// The descriptor is already registered in this runner.
    #[error("service already running")]
    AlreadyRunning,

    /// The runner has no record of the service.
    #[error("service unknown")]
    ServiceUnknown,

    /// Sentinel a compliant task returns when it ends on its own without
    /// a more specific reason.
    #[error("service ended")]
    Ended,

    /// The operation (or the task) observed cancellation.
    ///
    /// This is **not an error** in the traditional sense when returned by
    /// a task that was asked to halt; the runner treats it as a clean end.
    #[error("context canceled")]
    Canceled,

    /// `start_timeout` elapsed before the services became ready.
    #[error("start wait timeout after {timeout:?}")]
    WaitTimeout { timeout: Duration },

    /// `halt_timeout` elapsed before the services ended. The worker may
    /// still be running; see [`Runner::halt`](crate::Runner::halt).
    #[error("halt timeout after {timeout:?}")]
    HaltTimeout { timeout: Duration },

    /// An illegal lifecycle transition was attempted.
    #[error("state error: cannot move from {from} to {to}")]
    State { from: State, to: State },

    /// Application-specific task failure.
    #[error("execution failed: {reason}")]
    Failed { reason: String },

    /// A per-service error wrapped with the service's display name.
    #[error("service {name}: {source}")]
    Service { name: Name, source: Box<Error> },

    /// Collected per-service errors from a batch operation.
    #[error("{} service error(s) occurred", .0.len())]
    Aggregate(Vec<Error>),
}

impl Error {
    /// Shorthand for [`Error::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Error::Failed {
            reason: reason.into(),
        }
    }

    /// Wraps a per-service error with the service's name.
    pub(crate) fn wrap(err: Error, name: &Name) -> Error {
        Error::Service {
            name: name.clone(),
            source: Box::new(err),
        }
    }

    /// Builds an aggregate from collected slot errors, or `None` if every
    /// slot succeeded.
    pub(crate) fn aggregate(errors: Vec<Error>) -> Option<Error> {
        if errors.is_empty() {
            None
        } else {
            Some(Error::Aggregate(errors))
        }
    }

    /// Resolves the underlying cause, looking through [`Error::Service`]
    /// wrappers and aggregates that carry exactly one entry.
    pub fn cause(&self) -> &Error {
        match self {
            Error::Service { source, .. } => source.cause(),
            Error::Aggregate(errors) if errors.len() == 1 => errors[0].cause(),
            other => other,
        }
    }

    /// The individual errors of an aggregate, or the error itself.
    pub fn errors(&self) -> &[Error] {
        match self {
            Error::Aggregate(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }

    pub fn is_wait_timeout(&self) -> bool {
        matches!(self.cause(), Error::WaitTimeout { .. })
    }

    pub fn is_halt_timeout(&self) -> bool {
        matches!(self.cause(), Error::HaltTimeout { .. })
    }

    pub fn is_service_unknown(&self) -> bool {
        matches!(self.cause(), Error::ServiceUnknown)
    }

    pub fn is_already_running(&self) -> bool {
        matches!(self.cause(), Error::AlreadyRunning)
    }

    /// `true` for a state error whose current state is not a running one.
    pub fn is_not_running(&self) -> bool {
        matches!(self.cause(), Error::State { from, .. } if !from.is_running())
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::NotEnabled => "runner_not_enabled",
            Error::AlreadyRunning => "service_already_running",
            Error::ServiceUnknown => "service_unknown",
            Error::Ended => "service_ended",
            Error::Canceled => "canceled",
            Error::WaitTimeout { .. } => "wait_timeout",
            Error::HaltTimeout { .. } => "halt_timeout",
            Error::State { .. } => "state_error",
            Error::Failed { .. } => "failed",
            Error::Service { .. } => "service_error",
            Error::Aggregate(_) => "aggregate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_resolves_wrappers() {
        let inner = Error::WaitTimeout {
            timeout: Duration::from_secs(1),
        };
        let wrapped = Error::wrap(inner, &Name::from("svc"));
        assert!(wrapped.is_wait_timeout());

        let singleton = Error::Aggregate(vec![wrapped]);
        assert!(singleton.is_wait_timeout());
    }

    #[test]
    fn cause_stops_at_multi_aggregates() {
        let agg = Error::Aggregate(vec![Error::Ended, Error::NotEnabled]);
        assert!(!agg.is_wait_timeout());
        assert_eq!(agg.errors().len(), 2);
        assert_eq!(agg.cause(), &agg);
    }

    #[test]
    fn errors_of_plain_error_is_itself() {
        let err = Error::Ended;
        assert_eq!(err.errors(), std::slice::from_ref(&err));
    }

    #[test]
    fn not_running_predicate() {
        let err = Error::State {
            from: State::Halted,
            to: State::Started,
        };
        assert!(err.is_not_running());

        let err = Error::State {
            from: State::Started,
            to: State::Started,
        };
        assert!(!err.is_not_running());
    }

    #[test]
    fn aggregate_of_empty_is_none() {
        assert_eq!(Error::aggregate(Vec::new()), None);
        assert!(Error::aggregate(vec![Error::Ended]).is_some());
    }
}
