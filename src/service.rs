//! # Service descriptor.
//!
//! A [`Service`] bundles the [`Runnable`] with an optional display [`Name`]
//! and optional per-service listeners. The descriptor is caller-owned and
//! inert: nothing runs until it is passed to
//! [`Runner::start`](crate::Runner::start).
//!
//! Identity is the [`ServiceId`] assigned at construction. Clones share it,
//! so a clone refers to the same registry entry; build a second descriptor
//! if you want to run the same runnable twice in one runner.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::context::Context;
use crate::error::Error;
use crate::listener::{EndListener, StateListener};
use crate::runnable::{RunnableRef, ServiceFn};

static NEXT_SERVICE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a service descriptor.
///
/// Assigned once at construction; shared by clones of the descriptor.
/// Runners key their registries by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(u64);

impl ServiceId {
    fn next() -> Self {
        Self(NEXT_SERVICE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "svc-{}", self.0)
    }
}

/// Display name of a service, used when wrapping its errors.
///
/// Purely informational; uniqueness is not required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Name(Cow<'static, str>);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&'static str> for Name {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-owned descriptor of a supervised service.
///
/// # Example
/// ```
/// use servisor::Service;
///
/// let svc = Service::from_fn("hello", |ctx| async move {
///     ctx.ready()?;
///     ctx.done().await;
///     Ok(())
/// });
/// assert_eq!(svc.name().as_str(), "hello");
/// ```
#[derive(Clone)]
pub struct Service {
    id: ServiceId,
    name: Name,
    runnable: RunnableRef,
    on_end: Option<Arc<dyn EndListener>>,
    on_state: Option<Arc<dyn StateListener>>,
}

impl Service {
    /// Creates a descriptor for the given runnable.
    pub fn new(name: impl Into<Name>, runnable: RunnableRef) -> Self {
        Self {
            id: ServiceId::next(),
            name: name.into(),
            runnable,
            on_end: None,
            on_state: None,
        }
    }

    /// Creates a descriptor from a bare async function.
    ///
    /// The closure is called once per run and must produce a fresh future;
    /// shared state belongs in an explicit `Arc` inside the closure.
    pub fn from_fn<F, Fut>(name: impl Into<Name>, f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self::new(name, ServiceFn::arc(f))
    }

    /// Attaches a per-service end listener, fired once per run after the
    /// record leaves the registry.
    pub fn with_on_end(mut self, listener: impl EndListener) -> Self {
        self.on_end = Some(Arc::new(listener));
        self
    }

    /// Attaches a per-service state listener, fired on every transition.
    pub fn with_on_state(mut self, listener: impl StateListener) -> Self {
        self.on_state = Some(Arc::new(listener));
        self
    }

    pub fn id(&self) -> ServiceId {
        self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub(crate) fn runnable(&self) -> &RunnableRef {
        &self.runnable
    }

    pub(crate) fn on_end_listener(&self) -> Option<&Arc<dyn EndListener>> {
        self.on_end.as_ref()
    }

    pub(crate) fn on_state_listener(&self) -> Option<&Arc<dyn StateListener>> {
        self.on_state.as_ref()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let svc = Service::from_fn("a", |_ctx| async { Ok(()) });
        let clone = svc.clone();
        assert_eq!(svc.id(), clone.id());

        let other = Service::from_fn("a", |_ctx| async { Ok(()) });
        assert_ne!(svc.id(), other.id());
    }

    #[test]
    fn name_conversions() {
        assert_eq!(Name::from("fixed").as_str(), "fixed");
        assert_eq!(Name::from(String::from("owned")).as_str(), "owned");
        assert!(Name::default().is_empty());
    }
}
