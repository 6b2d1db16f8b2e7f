//! Collaborator contracts for health checks, recovery and guarded operations.
//!
//! Health checks and recovery routines are supplied by the owners of the
//! real clients (exchange connections, caches, streams). Both traits have
//! blanket implementations for async closures; [`health_check_fn`] and
//! [`recovery_fn`] wrap a plain `|| async { Ok(true) }` for registration.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

/// Probe reporting whether a component is currently healthy.
///
/// An `Err` means "no signal this cycle", not a failure.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> anyhow::Result<bool>;
}

#[async_trait]
impl<F, Fut> HealthCheck for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<bool>> + Send,
{
    async fn check(&self) -> anyhow::Result<bool> {
        (self)().await
    }
}

/// Routine that tries to bring a failed component back.
///
/// `Ok(false)` and `Err(_)` both count as a failed attempt.
#[async_trait]
pub trait Recovery: Send + Sync {
    async fn recover(&self) -> anyhow::Result<bool>;
}

#[async_trait]
impl<F, Fut> Recovery for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<bool>> + Send,
{
    async fn recover(&self) -> anyhow::Result<bool> {
        (self)().await
    }
}

/// Wrap an async closure as a shared [`HealthCheck`].
pub fn health_check_fn<F, Fut>(f: F) -> Arc<dyn HealthCheck>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    Arc::new(f)
}

/// Wrap an async closure as a shared [`Recovery`].
pub fn recovery_fn<F, Fut>(f: F) -> Arc<dyn Recovery>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
{
    Arc::new(f)
}

/// A boxed zero-argument operation, used for fallback chains whose
/// closures have distinct types.
pub type Operation<'a, T, E> = Box<dyn FnOnce() -> BoxFuture<'a, Result<T, E>> + Send + 'a>;

/// Box an async closure into an [`Operation`].
pub fn operation<'a, T, E, F, Fut>(f: F) -> Operation<'a, T, E>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = Result<T, E>> + Send + 'a,
{
    Box::new(move || Box::pin(f()))
}
