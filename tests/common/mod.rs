use async_trait::async_trait;
use foodnsap::{
    DurableStorage, FoodnsapError, MemoryStorage, MutationExecutor, QueuedMutation, Result,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Executor that records every call and can be told to reject the n-th one
/// (1-based, counted across the executor's lifetime).
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<QueuedMutation>>,
    count: AtomicUsize,
    fail_on: Option<usize>,
}

#[allow(dead_code)]
impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        RecordingExecutor {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    /// Every mutation the executor was invoked with, including the rejected
    /// one.
    pub fn calls(&self) -> Vec<QueuedMutation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.calls().iter().map(|m| m.to_string()).collect()
    }
}

#[async_trait]
impl MutationExecutor for RecordingExecutor {
    async fn execute(&self, mutation: &QueuedMutation) -> Result<()> {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(mutation.clone());
        if self.fail_on == Some(n) {
            return Err(FoodnsapError::Remote {
                status: 503,
                message: format!("rejected call {}", n),
            });
        }
        Ok(())
    }
}

/// Memory storage whose writes can be switched off.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    fail_writes: std::sync::Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FoodnsapError::Storage("disk full".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStorage for FlakyStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check()?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.remove(key).await
    }
}
