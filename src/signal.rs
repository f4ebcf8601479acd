//! # N-completion signal latch.
//!
//! [`signal`] returns a cloneable [`Signal`] and a single-consume
//! [`Waiter`]. The signal side accepts `capacity` completions, each with an
//! optional error; once the count is reached the waiter resolves with the
//! collected errors. The runner attaches one signal per batch operation:
//! start (one completion per service, from readiness or from the end path)
//! and halt/shutdown (one completion per service, from the end path).
//!
//! ## Rules
//! - The aggregate is delivered exactly once.
//! - Completions past `capacity` are accepted and ignored.
//! - A `capacity` of zero resolves the waiter immediately.
//! - Completions after the waiter is gone (dropped, or the caller's
//!   `select!` took the cancellation branch) are no-ops.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::Error;

/// Creates a latch expecting `capacity` completions.
pub(crate) fn signal(capacity: usize) -> (Signal, Waiter) {
    let (tx, rx) = oneshot::channel();
    let signal = Signal {
        state: Arc::new(Mutex::new(SignalState {
            remaining: capacity,
            errors: Vec::new(),
            tx: Some(tx),
        })),
    };
    if capacity == 0 {
        signal.flush();
    }
    (signal, Waiter { rx })
}

/// Completion side of the latch. Cheap to clone; every clone feeds the
/// same counter.
#[derive(Clone)]
pub(crate) struct Signal {
    state: Arc<Mutex<SignalState>>,
}

struct SignalState {
    remaining: usize,
    errors: Vec<Error>,
    tx: Option<oneshot::Sender<Vec<Error>>>,
}

impl Signal {
    /// Records one completion. `None` marks the slot successful.
    pub(crate) fn done(&self, err: Option<Error>) {
        let ready = {
            let mut state = self.state.lock();
            if state.tx.is_none() {
                return;
            }
            if let Some(err) = err {
                state.errors.push(err);
            }
            state.remaining = state.remaining.saturating_sub(1);
            if state.remaining == 0 {
                state
                    .tx
                    .take()
                    .map(|tx| (tx, std::mem::take(&mut state.errors)))
            } else {
                None
            }
        };
        if let Some((tx, errors)) = ready {
            // The waiter may already be gone; nothing to deliver to then.
            let _ = tx.send(errors);
        }
    }

    fn flush(&self) {
        let tx = self.state.lock().tx.take();
        if let Some(tx) = tx {
            let _ = tx.send(Vec::new());
        }
    }
}

/// Consumer side of the latch.
pub(crate) struct Waiter {
    rx: oneshot::Receiver<Vec<Error>>,
}

impl Waiter {
    /// Waits for all completions and yields the collected errors.
    pub(crate) async fn wait(self) -> Vec<Error> {
        self.rx.await.unwrap_or_default()
    }
}
