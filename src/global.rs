//! # Process-wide default runner.
//!
//! A lazily created [`Runner`] shared by the whole process, for programs
//! that do not want to thread a runner handle through every module. The
//! free functions mirror the runner's own surface.
//!
//! [`reset`] replaces the runner wholesale. Halt or shut down the current
//! services first; records tracked by the replaced runner are unreachable
//! afterwards and their workers leak.

use std::sync::OnceLock;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::runner::{Runner, ServiceInfo};
use crate::service::Service;
use crate::state::{State, StateQuery};

static GLOBAL: OnceLock<RwLock<Runner>> = OnceLock::new();

fn cell() -> &'static RwLock<Runner> {
    GLOBAL.get_or_init(|| RwLock::new(Runner::new()))
}

/// Handle to the current global runner.
pub fn runner() -> Runner {
    cell().read().clone()
}

/// Replaces the global runner with a fresh one without listeners.
pub fn reset() {
    *cell().write() = Runner::new();
}

/// Replaces the global runner with a caller-built one, e.g. to install
/// global listeners.
pub fn install(new: Runner) {
    *cell().write() = new;
}

/// [`Runner::start`] on the global runner.
pub async fn start(ctx: &CancellationToken, services: &[Service]) -> Result<(), Error> {
    runner().start(ctx, services).await
}

/// [`Runner::halt`] on the global runner.
pub async fn halt(ctx: &CancellationToken, services: &[Service]) -> Result<(), Error> {
    runner().halt(ctx, services).await
}

/// [`Runner::shutdown`] on the global runner.
pub async fn shutdown(ctx: &CancellationToken) -> Result<(), Error> {
    runner().shutdown(ctx).await
}

/// [`Runner::state`] on the global runner.
pub fn state(service: &Service) -> State {
    runner().state(service)
}

/// [`Runner::services`] on the global runner.
pub fn services(query: StateQuery, limit: usize) -> Vec<ServiceInfo> {
    runner().services(query, limit)
}
