//! # Test doubles for exercising runners.
//!
//! Small deliberately-shaped services used by this crate's own tests and
//! exported for downstream test suites: a well-behaved blocker, a service
//! that fails before readiness, and a defective one that ignores its halt
//! request.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::context::Context;
use crate::error::Error;
use crate::ops;
use crate::runnable::Runnable;

/// Well-behaved service: becomes ready (optionally after a delay) and
/// blocks until halted.
#[derive(Default)]
pub struct BlockingService {
    ready_delay: Option<Duration>,
}

impl BlockingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays the readiness signal; the delay itself honors halt.
    pub fn with_ready_delay(ready_delay: Duration) -> Self {
        Self {
            ready_delay: Some(ready_delay),
        }
    }
}

#[async_trait]
impl Runnable for BlockingService {
    async fn run(&self, ctx: Context) -> Result<(), Error> {
        if let Some(delay) = self.ready_delay {
            ops::sleep(&ctx, delay).await?;
        }
        ctx.ready()?;
        ctx.done().await;
        Ok(())
    }
}

/// Service that fails before ever becoming ready.
pub struct FailingService {
    reason: String,
}

impl FailingService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Runnable for FailingService {
    async fn run(&self, _ctx: Context) -> Result<(), Error> {
        Err(Error::failed(self.reason.clone()))
    }
}

/// Defective service that deliberately ignores its halt request.
///
/// It blocks until [`kill`](UnhaltableService::kill) is called, so tests
/// can provoke a halt timeout and then release the worker. Keep the
/// `Arc` you pass to the descriptor to retain access to `kill`.
#[derive(Default)]
pub struct UnhaltableService {
    gate: Notify,
}

impl UnhaltableService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases the blocked worker. Stores a permit, so calling it before
    /// the service reaches its wait is fine.
    pub fn kill(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Runnable for UnhaltableService {
    async fn run(&self, ctx: Context) -> Result<(), Error> {
        ctx.ready()?;
        self.gate.notified().await;
        Ok(())
    }
}
