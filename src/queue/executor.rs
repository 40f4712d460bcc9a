use crate::error::Result;
use crate::types::QueuedMutation;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Applies one queued mutation to the remote side.
///
/// Supplied by the caller of [`crate::OfflineQueue::flush`]; the queue knows
/// nothing about transport, auth or retries.
#[async_trait]
pub trait MutationExecutor: Send + Sync {
    async fn execute(&self, mutation: &QueuedMutation) -> Result<()>;
}

#[async_trait]
impl<E: MutationExecutor + ?Sized> MutationExecutor for Arc<E> {
    async fn execute(&self, mutation: &QueuedMutation) -> Result<()> {
        (**self).execute(mutation).await
    }
}

#[async_trait]
impl<E: MutationExecutor + ?Sized> MutationExecutor for &E {
    async fn execute(&self, mutation: &QueuedMutation) -> Result<()> {
        (**self).execute(mutation).await
    }
}

/// Executor backed by an async closure. Built with [`executor_fn`].
pub struct FnExecutor<F> {
    f: F,
}

/// Wrap an async closure taking an owned [`QueuedMutation`] as an executor.
///
/// ```rust
/// use foodnsap::queue::executor_fn;
///
/// let exec = executor_fn(|m| async move {
///     println!("replaying {}", m);
///     Ok::<(), foodnsap::FoodnsapError>(())
/// });
/// # let _ = exec;
/// ```
pub fn executor_fn<F, Fut>(f: F) -> FnExecutor<F>
where
    F: Fn(QueuedMutation) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    FnExecutor { f }
}

#[async_trait]
impl<F, Fut> MutationExecutor for FnExecutor<F>
where
    F: Fn(QueuedMutation) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    async fn execute(&self, mutation: &QueuedMutation) -> Result<()> {
        (self.f)(mutation.clone()).await
    }
}
