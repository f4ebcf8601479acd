//! # Lifecycle states and the transition table.
//!
//! A service moves through [`State`]s under the control of its runner:
//!
//! ```text
//! Halted ──► Starting ──► Started ──► Halting ──► Ended
//!               │                        ▲
//!               ├────────────────────────┘  (halted before ready)
//!               └─────────► Ended           (ended before ready)
//! ```
//!
//! `Halted` is both the implicit initial state and the terminal state: the
//! runner does not retain records for services it no longer tracks, so an
//! ended service and a never-started one are indistinguishable to callers.
//!
//! [`Stage`] tracks whether the service has passed its readiness handshake
//! and never regresses. [`RunnerState`] gates the runner itself.

use std::fmt;

/// Lifecycle state of a single service within a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Not tracked by the runner (initial and terminal).
    Halted,
    /// Registered, worker launched, readiness not yet signaled.
    Starting,
    /// The service signaled readiness and is in its steady state.
    Started,
    /// A halt was requested (or the service is winding down on its own).
    Halting,
    /// The worker returned; the record is about to be dropped.
    Ended,
}

impl State {
    /// Returns `true` while the runner retains a record for the service.
    pub fn is_running(&self) -> bool {
        matches!(self, State::Starting | State::Started | State::Halting)
    }

    /// Whether `self -> to` is an edge of the lifecycle DAG.
    pub(crate) fn can_transition(self, to: State) -> bool {
        matches!(
            (self, to),
            (State::Halted, State::Starting)
                | (State::Starting, State::Started)
                | (State::Starting, State::Halting)
                | (State::Starting, State::Ended)
                | (State::Started, State::Halting)
                | (State::Halting, State::Ended)
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            State::Halted => "halted",
            State::Starting => "starting",
            State::Started => "started",
            State::Halting => "halting",
            State::Ended => "ended",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Whether a service has passed its readiness handshake.
///
/// Latched to `Ready` until the task calls
/// [`Context::ready`](crate::Context::ready), then `Run`, never regressing.
/// The runner uses the stage to route a terminal error to the correct
/// waiter: a service that ends while still `Ready` reports through the
/// start path, one that ends in `Run` reports through the halt path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Readiness not yet signaled.
    Ready,
    /// Past the readiness handshake.
    Run,
}

impl Stage {
    pub fn as_label(&self) -> &'static str {
        match self {
            Stage::Ready => "ready",
            Stage::Run => "run",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// State of a [`Runner`](crate::Runner) as a whole.
///
/// New starts are accepted only while `Enabled`. `Suspended` rejects new
/// starts but leaves running services untouched. `Shutdown` is entered by
/// [`Runner::shutdown`](crate::Runner::shutdown) and rejects new starts
/// until [`Runner::enable`](crate::Runner::enable) is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunnerState {
    #[default]
    Enabled,
    Suspended,
    Shutdown,
}

impl RunnerState {
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerState::Enabled => "enabled",
            RunnerState::Suspended => "suspended",
            RunnerState::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Filter for [`Runner::services`](crate::Runner::services).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateQuery {
    /// Every tracked service.
    Any,
    /// Any service the runner still retains (`Starting`, `Started`,
    /// `Halting`). Equivalent to `Any` in practice, spelled out for
    /// callers that want the intent in the code.
    Running,
    /// Services in exactly this state. `Is(Halted)` always yields nothing
    /// because halted services are not retained.
    Is(State),
}

impl StateQuery {
    pub fn matches(&self, state: State) -> bool {
        match self {
            StateQuery::Any => true,
            StateQuery::Running => state.is_running(),
            StateQuery::Is(query) => state == *query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        assert!(State::Halted.can_transition(State::Starting));
        assert!(State::Starting.can_transition(State::Started));
        assert!(State::Starting.can_transition(State::Halting));
        assert!(State::Starting.can_transition(State::Ended));
        assert!(State::Started.can_transition(State::Halting));
        assert!(State::Halting.can_transition(State::Ended));

        // No edge skips the halt phase once the service is started,
        // and nothing leaves the terminal states.
        assert!(!State::Started.can_transition(State::Ended));
        assert!(!State::Started.can_transition(State::Starting));
        assert!(!State::Halting.can_transition(State::Started));
        assert!(!State::Ended.can_transition(State::Starting));
        assert!(!State::Halted.can_transition(State::Started));
    }

    #[test]
    fn running_predicate() {
        assert!(State::Starting.is_running());
        assert!(State::Started.is_running());
        assert!(State::Halting.is_running());
        assert!(!State::Halted.is_running());
        assert!(!State::Ended.is_running());
    }

    #[test]
    fn query_matching() {
        assert!(StateQuery::Any.matches(State::Starting));
        assert!(StateQuery::Running.matches(State::Halting));
        assert!(!StateQuery::Running.matches(State::Ended));
        assert!(StateQuery::Is(State::Started).matches(State::Started));
        assert!(!StateQuery::Is(State::Started).matches(State::Starting));
    }
}
