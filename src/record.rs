//! Per-service record owned by the runner.
//!
//! Created by `start`, destroyed by the end path. Holds the lifecycle
//! state, the readiness/halt waiters and the cancellation token the task
//! observes through its [`Context`](crate::Context).
//!
//! Lock order: the runner's registry lock first, then the record lock.
//! No path takes them in the reverse order. Waiter signals taken out of
//! the record are completed by the caller after the locks are released.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::service::Service;
use crate::signal::Signal;
use crate::state::{Stage, State};

pub(crate) struct ServiceRecord {
    id: u64,
    service: Service,
    token: CancellationToken,
    st: Mutex<RecordState>,
}

struct RecordState {
    state: State,
    stage: Stage,
    ready_called: bool,
    /// Pending readiness waiter from `start`; taken by whichever of
    /// ready/halt/end gets there first.
    ready: Option<Signal>,
    /// Halt waiters, completed on the end path.
    waiters: Vec<Signal>,
}

/// What the end path found in the record, handed back to the runner so
/// waiters can be completed without any lock held.
pub(crate) struct EndOutcome {
    /// State the service was in when its worker returned.
    pub(crate) prev: State,
    pub(crate) stage: Stage,
    /// Transitions performed, in order, for state listeners.
    pub(crate) transitions: Vec<(State, State)>,
    pub(crate) ready: Option<Signal>,
    pub(crate) waiters: Vec<Signal>,
}

impl ServiceRecord {
    pub(crate) fn new(id: u64, service: Service, ready: Signal) -> Self {
        Self {
            id,
            service,
            token: CancellationToken::new(),
            st: Mutex::new(RecordState {
                state: State::Starting,
                stage: Stage::Ready,
                ready_called: false,
                ready: Some(ready),
                waiters: Vec::new(),
            }),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn service(&self) -> &Service {
        &self.service
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn state(&self) -> State {
        self.st.lock().state
    }

    /// Starting -> Started, driven by the task's `ready` call.
    ///
    /// Returns the pending readiness signal for the caller to complete
    /// outside the lock.
    pub(crate) fn begin_ready(&self) -> Result<Option<Signal>, Error> {
        let mut st = self.st.lock();
        if st.state == State::Halting {
            return Err(Error::Canceled);
        }
        if st.ready_called || !st.state.can_transition(State::Started) {
            return Err(Error::State {
                from: st.state,
                to: State::Started,
            });
        }
        st.state = State::Started;
        st.stage = Stage::Run;
        st.ready_called = true;
        Ok(st.ready.take())
    }

    /// Transition to Halting and cancel the done token.
    ///
    /// Lenient when the record is already Halting: the waiter is attached
    /// and nothing else changes. Returns the released readiness signal (a
    /// start blocked on this service unblocks as soon as the halt is
    /// requested) and the transition to report, if one happened.
    pub(crate) fn begin_halt(
        &self,
        waiter: Option<Signal>,
    ) -> (Option<Signal>, Option<(State, State)>) {
        let mut st = self.st.lock();
        match st.state {
            State::Starting | State::Started => {
                let from = st.state;
                st.state = State::Halting;
                if let Some(waiter) = waiter {
                    st.waiters.push(waiter);
                }
                let ready = st.ready.take();
                self.token.cancel();
                (ready, Some((from, State::Halting)))
            }
            _ => {
                if let Some(waiter) = waiter {
                    st.waiters.push(waiter);
                }
                (None, None)
            }
        }
    }

    /// Drives the record to Ended after its worker returned.
    ///
    /// A service still in Started passes through Halting first so
    /// observers never see the halt phase skipped.
    pub(crate) fn finish(&self) -> EndOutcome {
        let mut st = self.st.lock();
        let prev = st.state;
        let mut transitions = Vec::with_capacity(2);
        if st.state == State::Started {
            st.state = State::Halting;
            transitions.push((State::Started, State::Halting));
        }
        transitions.push((st.state, State::Ended));
        st.state = State::Ended;
        st.ready_called = false;
        self.token.cancel();
        EndOutcome {
            prev,
            stage: st.stage,
            transitions,
            ready: st.ready.take(),
            waiters: std::mem::take(&mut st.waiters),
        }
    }
}
