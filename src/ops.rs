//! # Convenience wrappers over the runner.
//!
//! Bounded variants of [`Runner::start`] and [`Runner::halt`] plus the
//! [`sleep`] helper tasks should use instead of a bare timer, so a pending
//! halt is never stuck behind an unbounded sleep.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::context::Context;
use crate::error::Error;
use crate::runner::Runner;
use crate::service::Service;

/// [`Runner::start`] bounded by `timeout`.
///
/// On elapse returns [`Error::WaitTimeout`]; the services keep starting in
/// the background and must still be halted by the caller.
pub async fn start_timeout(
    timeout: Duration,
    runner: &Runner,
    services: &[Service],
) -> Result<(), Error> {
    let ctx = CancellationToken::new();
    match time::timeout(timeout, runner.start(&ctx, services)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(Error::WaitTimeout { timeout }),
    }
}

/// [`Runner::halt`] bounded by `timeout`.
///
/// On elapse returns [`Error::HaltTimeout`]. The affected workers may
/// still be running and cannot be reclaimed; see [`Runner::halt`].
pub async fn halt_timeout(
    timeout: Duration,
    runner: &Runner,
    services: &[Service],
) -> Result<(), Error> {
    let ctx = CancellationToken::new();
    match time::timeout(timeout, runner.halt(&ctx, services)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(Error::HaltTimeout { timeout }),
    }
}

/// Halts one service, tolerating a service this runner does not know or
/// that is not running. Use when the caller only needs the service gone
/// and does not care who stopped it.
pub async fn ensure_halt(timeout: Duration, runner: &Runner, service: &Service) -> Result<(), Error> {
    match halt_timeout(timeout, runner, std::slice::from_ref(service)).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_service_unknown() || err.is_not_running() => Ok(()),
        Err(err) => Err(err),
    }
}

/// Sleeps up to `duration`, returning early with [`Error::Canceled`] when
/// the service is asked to halt.
pub async fn sleep(ctx: &Context, duration: Duration) -> Result<(), Error> {
    tokio::select! {
        _ = time::sleep(duration) => Ok(()),
        _ = ctx.done() => Err(Error::Canceled),
    }
}
