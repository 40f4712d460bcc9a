//! Durable FIFO of mutations that could not be applied while offline.

use super::executor::MutationExecutor;
use super::storage::DurableStorage;
use crate::error::{FoodnsapError, Result};
use crate::types::QueuedMutation;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Storage key the app has always used for its queue.
pub const DEFAULT_QUEUE_KEY: &str = "offlineNutritionQueue";

/// How `flush` treats entries that were applied before a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushMode {
    /// Clear the whole queue only after every entry succeeded. A failure
    /// leaves the stored sequence untouched, so entries applied earlier in the
    /// pass are replayed again next time (at-least-once).
    #[default]
    Batch,
    /// Drop each entry from storage as soon as its executor call succeeds.
    /// A failure leaves only the entries that were not applied.
    PerItem,
}

impl FromStr for FlushMode {
    type Err = FoodnsapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(FlushMode::Batch),
            "per-item" | "per_item" | "peritem" => Ok(FlushMode::PerItem),
            other => Err(FoodnsapError::Config(format!(
                "unknown flush mode '{}', expected 'batch' or 'per-item'",
                other
            ))),
        }
    }
}

impl fmt::Display for FlushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushMode::Batch => f.write_str("batch"),
            FlushMode::PerItem => f.write_str("per-item"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Empty,
    NonEmpty(usize),
}

/// Outcome of a flush that ran to completion. A pass that stops early is
/// reported through [`FoodnsapError::Executor`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    pub applied: usize,
}

/// Offline mutation queue persisted under a single storage key as a JSON
/// array.
///
/// Operations on one handle are serialized by an internal lock. Handles over
/// the same storage in different processes are not coordinated.
pub struct OfflineQueue {
    storage: Arc<dyn DurableStorage>,
    key: String,
    mode: FlushMode,
    lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(storage: impl DurableStorage + 'static) -> Self {
        Self::from_shared(Arc::new(storage))
    }

    pub fn from_shared(storage: Arc<dyn DurableStorage>) -> Self {
        OfflineQueue {
            storage,
            key: DEFAULT_QUEUE_KEY.to_string(),
            mode: FlushMode::default(),
            lock: Mutex::new(()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_mode(mut self, mode: FlushMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> FlushMode {
        self.mode
    }

    async fn load(&self) -> Result<Vec<QueuedMutation>> {
        let raw = match self.storage.get(&self.key).await? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            tracing::error!("[QUEUE {}] stored queue is unreadable: {}", self.key, e);
            FoodnsapError::Serialization(e.to_string())
        })
    }

    async fn store<'a, I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a QueuedMutation>,
    {
        let items: Vec<&QueuedMutation> = items.into_iter().collect();
        if items.is_empty() {
            return self.storage.remove(&self.key).await;
        }
        let encoded = serde_json::to_string(&items)
            .map_err(|e| FoodnsapError::Serialization(e.to_string()))?;
        self.storage.set(&self.key, encoded).await
    }

    /// Append one mutation. Returns the queue length afterwards.
    ///
    /// Once this returns `Ok`, the mutation is in durable storage.
    pub async fn enqueue(&self, mutation: QueuedMutation) -> Result<usize> {
        self.enqueue_all(vec![mutation]).await
    }

    /// Append several mutations with a single storage write, in order.
    pub async fn enqueue_all(&self, mutations: Vec<QueuedMutation>) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        if mutations.is_empty() {
            return Ok(items.len());
        }
        for m in &mutations {
            tracing::debug!("[QUEUE {}] enqueue {}", self.key, m);
        }
        items.extend(mutations);
        self.store(&items).await?;
        Ok(items.len())
    }

    /// Edit the stored sequence in place under the queue lock. Storage is
    /// written once, and only when `f` changed something.
    pub async fn rewrite<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<QueuedMutation>) -> T,
    {
        let _guard = self.lock.lock().await;
        let before = self.load().await?;
        let mut items = before.clone();
        let out = f(&mut items);
        if items != before {
            tracing::debug!(
                "[QUEUE {}] rewrite, {} -> {} entries",
                self.key,
                before.len(),
                items.len()
            );
            self.store(&items).await?;
        }
        Ok(out)
    }

    /// Replay every stored mutation through `executor`, one at a time, oldest
    /// first.
    ///
    /// Returns immediately when nothing is stored. An executor failure aborts
    /// the pass and is returned as [`FoodnsapError::Executor`]; what stays
    /// queued depends on the [`FlushMode`].
    pub async fn flush<E>(&self, executor: &E) -> Result<FlushReport>
    where
        E: MutationExecutor + ?Sized,
    {
        let _guard = self.lock.lock().await;
        let items = self.load().await?;
        if items.is_empty() {
            return Ok(FlushReport::default());
        }

        tracing::info!(
            "[QUEUE {}] flushing {} mutations ({})",
            self.key,
            items.len(),
            self.mode
        );

        let report = match self.mode {
            FlushMode::Batch => self.flush_batch(executor, &items).await?,
            FlushMode::PerItem => self.flush_per_item(executor, items.into()).await?,
        };

        tracing::info!("[QUEUE {}] flush done, applied {}", self.key, report.applied);
        Ok(report)
    }

    async fn flush_batch<E>(&self, executor: &E, items: &[QueuedMutation]) -> Result<FlushReport>
    where
        E: MutationExecutor + ?Sized,
    {
        for (position, mutation) in items.iter().enumerate() {
            if let Err(e) = executor.execute(mutation).await {
                tracing::warn!(
                    "[QUEUE {}] {} failed at position {}, keeping all {} queued: {}",
                    self.key,
                    mutation,
                    position,
                    items.len(),
                    e
                );
                return Err(FoodnsapError::Executor {
                    position,
                    remaining: items.len(),
                    retryable: e.is_transient(),
                    message: e.to_string(),
                });
            }
        }
        self.storage.remove(&self.key).await?;
        Ok(FlushReport {
            applied: items.len(),
        })
    }

    async fn flush_per_item<E>(
        &self,
        executor: &E,
        mut remaining: VecDeque<QueuedMutation>,
    ) -> Result<FlushReport>
    where
        E: MutationExecutor + ?Sized,
    {
        let mut applied = 0;
        while let Some(mutation) = remaining.front() {
            if let Err(e) = executor.execute(mutation).await {
                tracing::warn!(
                    "[QUEUE {}] {} failed at position {}, {} left queued: {}",
                    self.key,
                    mutation,
                    applied,
                    remaining.len(),
                    e
                );
                return Err(FoodnsapError::Executor {
                    position: applied,
                    remaining: remaining.len(),
                    retryable: e.is_transient(),
                    message: e.to_string(),
                });
            }
            remaining.pop_front();
            self.store(&remaining).await?;
            applied += 1;
        }
        Ok(FlushReport { applied })
    }

    /// Snapshot of the stored sequence, oldest first.
    pub async fn pending(&self) -> Result<Vec<QueuedMutation>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    pub async fn len(&self) -> Result<usize> {
        Ok(self.pending().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn state(&self) -> Result<QueueState> {
        Ok(match self.len().await? {
            0 => QueueState::Empty,
            n => QueueState::NonEmpty(n),
        })
    }

    /// Drop the stored queue without replaying it. This is the way out when
    /// the stored content can no longer be decoded.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        tracing::warn!("[QUEUE {}] reset, discarding stored mutations", self.key);
        self.storage.remove(&self.key).await
    }
}
