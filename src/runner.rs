//! # Runner: registry and lifecycle driver for services.
//!
//! The [`Runner`] owns the set of active services and drives each through
//! its lifecycle: register, spawn the worker, wait for readiness, halt,
//! and clean up when the worker returns.
//!
//! ## Architecture
//! ```text
//! Service[] ──► Runner::start()
//!                  │  register record (Starting), spawn worker
//!                  │         │
//!                  │         └──► Runnable::run(ctx)
//!                  │                  ├── ctx.ready() ──► Started, start() unblocks
//!                  │                  └── returns ─────► end path
//!                  │
//!               Runner::halt() ──► Halting, cancel token, wait for end
//!                  │
//!               end path: remove from registry ► Ended ► listeners ► waiters
//! ```
//!
//! ## Rules
//! - The registry is the only shared map; one lock guards it. Removal on
//!   the end path happens before any waiter is notified, so a sequential
//!   `halt` then `start` of the same descriptor always succeeds.
//! - Waiters are completed with no lock held; listeners run on dedicated
//!   workers. Either may re-enter the runner.
//! - `start`, `halt` and `shutdown` honor their outer cancellation token
//!   with an early [`Error::Canceled`] return. A cancelled wait does not
//!   halt anything by itself: the affected workers keep running until
//!   halted (or, after a cancelled halt, are leaked).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::context::Context;
use crate::error::Error;
use crate::listener::{EndListener, ErrorListener, StateListener};
use crate::record::ServiceRecord;
use crate::service::{Service, ServiceId};
use crate::signal::{signal, Signal, Waiter};
use crate::state::{RunnerState, Stage, State, StateQuery};

/// Snapshot entry returned by [`Runner::services`].
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub state: State,
    pub service: Service,
}

/// Builder for a [`Runner`] with optional global listeners.
///
/// Listeners are frozen at [`build`](RunnerBuilder::build) and cannot be
/// replaced afterwards; they are read without synchronization.
#[derive(Default)]
pub struct RunnerBuilder {
    on_end: Option<Arc<dyn EndListener>>,
    on_error: Option<Arc<dyn ErrorListener>>,
    on_state: Option<Arc<dyn StateListener>>,
}

impl RunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Global end listener, fired once per run of every service.
    pub fn on_end(mut self, listener: impl EndListener) -> Self {
        self.on_end = Some(Arc::new(listener));
        self
    }

    /// Global error listener behind [`Context::on_error`].
    pub fn on_error(mut self, listener: impl ErrorListener) -> Self {
        self.on_error = Some(Arc::new(listener));
        self
    }

    /// Global state listener, fired on every transition of every service.
    pub fn on_state(mut self, listener: impl StateListener) -> Self {
        self.on_state = Some(Arc::new(listener));
        self
    }

    pub fn build(self) -> Runner {
        Runner {
            inner: Arc::new(RunnerInner {
                on_end: self.on_end,
                on_error: self.on_error,
                on_state: self.on_state,
                registry: Mutex::new(Registry {
                    state: RunnerState::Enabled,
                    next_id: 0,
                    services: HashMap::new(),
                }),
            }),
        }
    }
}

/// Starts, halts and tracks services.
///
/// Cheap to clone; clones share the registry. See the crate docs for a
/// complete example.
#[derive(Clone)]
pub struct Runner {
    inner: Arc<RunnerInner>,
}

pub(crate) struct RunnerInner {
    // Listeners are never replaced after construction; read without a lock.
    on_end: Option<Arc<dyn EndListener>>,
    on_error: Option<Arc<dyn ErrorListener>>,
    on_state: Option<Arc<dyn StateListener>>,

    registry: Mutex<Registry>,
}

struct Registry {
    state: RunnerState,
    next_id: u64,
    services: HashMap<ServiceId, Arc<ServiceRecord>>,
}

impl Runner {
    /// Creates a runner without listeners.
    pub fn new() -> Self {
        RunnerBuilder::new().build()
    }

    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::new()
    }

    /// Starts the given services and waits until every one of them is
    /// ready, has ended, or the outer token is cancelled.
    ///
    /// Per-service failures (including `service already running` for a
    /// descriptor this runner already tracks) are collected into an
    /// [`Error::Aggregate`]; one slow or failing service never suppresses
    /// its siblings. If `ctx` wins the race the call returns
    /// [`Error::Canceled`] and the services are left as they are; follow
    /// up with [`halt`](Runner::halt) or [`shutdown`](Runner::shutdown).
    pub async fn start(&self, ctx: &CancellationToken, services: &[Service]) -> Result<(), Error> {
        if services.is_empty() {
            return Ok(());
        }

        let waiter = {
            let mut registry = self.inner.registry.lock();
            if registry.state != RunnerState::Enabled {
                return Err(Error::NotEnabled);
            }

            let (ready, waiter) = signal(services.len());

            for service in services {
                if registry.services.contains_key(&service.id()) {
                    ready.done(Some(Error::wrap(Error::AlreadyRunning, service.name())));
                    continue;
                }

                registry.next_id += 1;
                let record = Arc::new(ServiceRecord::new(
                    registry.next_id,
                    service.clone(),
                    ready.clone(),
                ));
                registry.services.insert(service.id(), Arc::clone(&record));

                self.inner
                    .raise_on_state(service, State::Halted, State::Starting);
                self.spawn_worker(record);
            }

            waiter
        };

        self.await_signal(ctx, waiter).await
    }

    /// Halts the given services and waits until every one of them has
    /// ended or the outer token is cancelled.
    ///
    /// Halting an unregistered service is a no-op slot (idempotent halt),
    /// and halting a service that never became ready is legal. If `ctx`
    /// wins the race the worker may still be running; such a worker cannot
    /// be reclaimed and is leaked.
    pub async fn halt(&self, ctx: &CancellationToken, services: &[Service]) -> Result<(), Error> {
        if services.is_empty() {
            return Ok(());
        }

        let (done, waiter) = signal(services.len());
        let mut released = Vec::new();
        {
            let registry = self.inner.registry.lock();
            for service in services {
                match registry.services.get(&service.id()) {
                    None => done.done(None),
                    Some(record) => self.begin_halt(record, done.clone(), &mut released),
                }
            }
        }
        for ready in released {
            ready.done(None);
        }

        self.await_signal(ctx, waiter).await
    }

    /// Halts every service in this runner and rejects new starts.
    ///
    /// A second call reports [`Error::NotEnabled`]; so does every
    /// subsequent [`start`](Runner::start) until [`enable`](Runner::enable)
    /// is called.
    pub async fn shutdown(&self, ctx: &CancellationToken) -> Result<(), Error> {
        let (waiter, released) = {
            let mut registry = self.inner.registry.lock();
            if registry.state == RunnerState::Shutdown {
                return Err(Error::NotEnabled);
            }
            registry.state = RunnerState::Shutdown;

            let (done, waiter) = signal(registry.services.len());
            let mut released = Vec::new();
            for record in registry.services.values() {
                self.begin_halt(record, done.clone(), &mut released);
            }
            (waiter, released)
        };
        for ready in released {
            ready.done(None);
        }

        self.await_signal(ctx, waiter).await
    }

    /// Restores the runner to `Enabled` from any state, including
    /// `Shutdown`.
    pub fn enable(&self) {
        self.inner.registry.lock().state = RunnerState::Enabled;
    }

    /// Rejects new starts without touching running services.
    pub fn suspend(&self) -> Result<(), Error> {
        let mut registry = self.inner.registry.lock();
        if registry.state != RunnerState::Enabled {
            return Err(Error::NotEnabled);
        }
        registry.state = RunnerState::Suspended;
        Ok(())
    }

    pub fn runner_state(&self) -> RunnerState {
        self.inner.registry.lock().state
    }

    /// Current state of the service, or `Halted` if this runner does not
    /// track it. A never-started and an already-ended service are
    /// indistinguishable.
    pub fn state(&self, service: &Service) -> State {
        self.inner
            .registry
            .lock()
            .services
            .get(&service.id())
            .map(|record| record.state())
            .unwrap_or(State::Halted)
    }

    /// Snapshot of tracked services matching `query`, up to `limit`
    /// entries (`0` means no limit). Ordering is unspecified, and entries
    /// may have ended by the time the caller inspects them.
    pub fn services(&self, query: StateQuery, limit: usize) -> Vec<ServiceInfo> {
        let mut out = Vec::new();
        self.services_into(query, limit, &mut out);
        out
    }

    /// Like [`services`](Runner::services), appending into `into` so
    /// callers can recycle the backing storage across polls.
    pub fn services_into(&self, query: StateQuery, limit: usize, into: &mut Vec<ServiceInfo>) {
        if query == StateQuery::Is(State::Halted) {
            // Halted services are not retained.
            return;
        }

        let registry = self.inner.registry.lock();
        let mut appended = 0;
        for record in registry.services.values() {
            if limit != 0 && appended >= limit {
                break;
            }
            let state = record.state();
            if query.matches(state) {
                into.push(ServiceInfo {
                    state,
                    service: record.service().clone(),
                });
                appended += 1;
            }
        }
    }

    /// Requests the halt of one record, collecting the readiness signal it
    /// released (completed after the registry lock drops).
    fn begin_halt(&self, record: &Arc<ServiceRecord>, done: Signal, released: &mut Vec<Signal>) {
        let (ready, transition) = record.begin_halt(Some(done));
        if let Some(ready) = ready {
            released.push(ready);
        }
        if let Some((from, to)) = transition {
            self.inner.raise_on_state(record.service(), from, to);
        }
    }

    fn spawn_worker(&self, record: Arc<ServiceRecord>) {
        let inner = Arc::clone(&self.inner);
        let ctx = Context::new(Arc::clone(&record), Arc::clone(&self.inner));
        tokio::spawn(async move {
            let result = record.service().runnable().run(ctx).await;
            inner.ended(&record, result);
        });
    }

    async fn await_signal(&self, ctx: &CancellationToken, waiter: Waiter) -> Result<(), Error> {
        tokio::select! {
            errors = waiter.wait() => match Error::aggregate(errors) {
                None => Ok(()),
                Some(err) => Err(err),
            },
            _ = ctx.cancelled() => Err(Error::Canceled),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerInner {
    /// End path, invoked by every worker exactly once after its run
    /// returns.
    ///
    /// Removal from the registry MUST precede waiter notification: a
    /// caller woken by `halt` may immediately `start` the same descriptor
    /// again and must not see `service already running`.
    pub(crate) fn ended(&self, record: &Arc<ServiceRecord>, result: Result<(), Error>) {
        let (outcome, err) = {
            let mut registry = self.registry.lock();
            registry.services.remove(&record.service().id());

            let outcome = record.finish();
            let err = match result {
                // A clean end is a return (or a cancellation error) after
                // the halt was requested.
                Ok(()) if outcome.prev == State::Halting => None,
                Err(Error::Canceled) if outcome.prev == State::Halting => None,
                // Returning Ok while nobody asked the service to stop
                // violates the run contract; never promote it to success.
                Ok(()) => Some(Error::State {
                    from: outcome.prev,
                    to: State::Ended,
                }),
                Err(err) => Some(err),
            };

            for (from, to) in &outcome.transitions {
                self.raise_on_state(record.service(), *from, *to);
            }
            self.raise_on_end(outcome.stage, record.service(), err.as_ref());

            (outcome, err)
        };

        // Locks are gone; now the waiters. A service that never became
        // ready reports through the readiness slot only, so a later halt
        // does not receive a second copy of the same error.
        let err = err.map(|err| Error::wrap(err, record.service().name()));
        match outcome.stage {
            Stage::Ready => {
                if let Some(ready) = outcome.ready {
                    ready.done(err);
                }
                for waiter in outcome.waiters {
                    waiter.done(None);
                }
            }
            Stage::Run => {
                for waiter in outcome.waiters {
                    waiter.done(err.clone());
                }
            }
        }
    }

    pub(crate) fn raise_on_state(&self, service: &Service, from: State, to: State) {
        if let Some(listener) = &self.on_state {
            let listener = Arc::clone(listener);
            let service = service.clone();
            tokio::spawn(async move { listener.on_state(&service, from, to) });
        }
        if let Some(listener) = service.on_state_listener() {
            let listener = Arc::clone(listener);
            let service = service.clone();
            tokio::spawn(async move { listener.on_state(&service, from, to) });
        }
    }

    pub(crate) fn raise_on_error(&self, service: &Service, err: Error) {
        if let Some(listener) = &self.on_error {
            let listener = Arc::clone(listener);
            let service = service.clone();
            tokio::spawn(async move { listener.on_error(&service, &err) });
        }
    }

    fn raise_on_end(&self, stage: Stage, service: &Service, err: Option<&Error>) {
        if let Some(listener) = &self.on_end {
            let listener = Arc::clone(listener);
            let service = service.clone();
            let err = err.cloned();
            tokio::spawn(async move { listener.on_end(stage, &service, err.as_ref()) });
        }
        if let Some(listener) = service.on_end_listener() {
            let listener = Arc::clone(listener);
            let service = service.clone();
            let err = err.cloned();
            tokio::spawn(async move { listener.on_end(stage, &service, err.as_ref()) });
        }
    }
}
