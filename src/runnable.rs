//! # Runnable: the executable body of a service.
//!
//! A [`Runnable`] has a single async [`run`](Runnable::run) method that
//! receives a [`Context`] and runs until halted or failed. [`ServiceFn`]
//! wraps a plain async closure; [`RunnableRef`] is the shared handle the
//! descriptor carries.
//!
//! ## Contract
//! A valid `run` implementation MUST:
//! - call [`Context::ready`] exactly once, and check its error;
//! - observe [`Context::done`] (or poll [`Context::should_halt`]) often
//!   enough to honor the caller's halt deadlines;
//! - return a non-`Ok` value if it ends before being asked to halt
//!   ([`Error::Ended`] when nothing more specific applies).
//!
//! A `run` that returns `Ok` while its service was never asked to halt is
//! reported to listeners as a state error.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Error;

/// Shared handle to a runnable.
pub type RunnableRef = Arc<dyn Runnable>;

/// Long-running unit of work driven by a [`Runner`](crate::Runner).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use servisor::{Context, Error, Runnable};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Runnable for Echo {
///     async fn run(&self, ctx: Context) -> Result<(), Error> {
///         ctx.ready()?;
///         ctx.done().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Runnable: Send + Sync + 'static {
    /// Executes the service until completion or halt.
    async fn run(&self, ctx: Context) -> Result<(), Error>;
}

/// Function-backed runnable.
///
/// Wraps a closure that creates a fresh future per run, so restarts do not
/// share hidden state; share state through an explicit `Arc` captured by
/// the closure if you need it.
pub struct ServiceFn<F> {
    f: F,
}

impl<F, Fut> ServiceFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the runnable and returns it as a shared handle.
    pub fn arc(f: F) -> RunnableRef {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Runnable for ServiceFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    async fn run(&self, ctx: Context) -> Result<(), Error> {
        (self.f)(ctx).await
    }
}
