//! # servisor
//!
//! **Servisor** is a lightweight service lifecycle library.
//!
//! It manages long-running async tasks ("services") with a defined
//! lifecycle: a readiness handshake between launcher and task, halting
//! with a bounded wait, uniform end-of-life reporting, and the ability to
//! observe a service's state from outside it. It is designed as a
//! building block for daemons and higher-level orchestrators.
//!
//! ## Features
//!
//! | Area           | Description                                                      | Key types / traits                          |
//! |----------------|------------------------------------------------------------------|---------------------------------------------|
//! | **Runner**     | Registry owning active services; start, halt, shutdown.          | [`Runner`], [`RunnerBuilder`]               |
//! | **Services**   | Define services as types or bare functions.                      | [`Runnable`], [`ServiceFn`], [`Service`]    |
//! | **Context**    | Task-side handle: readiness, halt observation, error channel.    | [`Context`]                                 |
//! | **Listeners**  | Hook into ends, transitions and non-fatal errors.                | [`EndListener`], [`StateListener`], [`ErrorListener`] |
//! | **Errors**     | Typed, kind-checkable errors with aggregation.                   | [`Error`]                                   |
//! | **Wrappers**   | Bounded start/halt, cancellable sleep, global runner.            | [`start_timeout`], [`halt_timeout`], [`global`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogListener`] _(demo/reference only)_.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use servisor::{halt_timeout, start_timeout, Runner, Service};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Runner::new();
//!
//!     // A service must signal readiness once, then watch for its halt.
//!     let ticker = Service::from_fn("ticker", |ctx| async move {
//!         ctx.ready()?;
//!         loop {
//!             tokio::select! {
//!                 _ = tokio::time::sleep(Duration::from_millis(250)) => println!("tick"),
//!                 _ = ctx.done() => return Ok(()),
//!             }
//!         }
//!     });
//!
//!     start_timeout(Duration::from_secs(1), &runner, &[ticker.clone()]).await?;
//!     tokio::time::sleep(Duration::from_secs(1)).await;
//!     halt_timeout(Duration::from_secs(1), &runner, &[ticker]).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## The run contract
//!
//! A [`Runnable::run`] implementation MUST call [`Context::ready`] exactly
//! once and check its error, MUST observe [`Context::done`] (or poll
//! [`Context::should_halt`]) frequently enough to honor halt deadlines,
//! and MUST return an error if it ends without being asked to halt
//! ([`Error::Ended`] when nothing more specific applies). A cancelled
//! halt cannot reclaim a misbehaving worker; it is leaked and the halt
//! reports a timeout.
//!
//! ---

mod context;
mod error;
mod listener;
mod ops;
mod record;
mod runnable;
mod runner;
mod service;
mod signal;
mod state;

pub mod global;
pub mod testing;

// ---- Public re-exports ----

pub use context::Context;
pub use error::Error;
pub use listener::{EndListener, ErrorListener, StateListener};
pub use ops::{ensure_halt, halt_timeout, sleep, start_timeout};
pub use runnable::{Runnable, RunnableRef, ServiceFn};
pub use runner::{Runner, RunnerBuilder, ServiceInfo};
pub use service::{Name, Service, ServiceId};
pub use state::{RunnerState, Stage, State, StateQuery};

// Optional: expose a simple built-in log listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listener::LogListener;
