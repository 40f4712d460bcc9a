use crate::error::Result;
use crate::queue::{FileStorage, FlushMode, OfflineQueue, DEFAULT_QUEUE_KEY};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub data_dir: PathBuf,
    pub queue_key: String,
    pub flush_mode: FlushMode,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            data_dir: PathBuf::from("./data"),
            queue_key: DEFAULT_QUEUE_KEY.to_string(),
            flush_mode: FlushMode::Batch,
        }
    }
}

impl QueueConfig {
    /// Load queue configuration from environment variables.
    ///
    /// Optional: FOODNSAP_DATA_DIR (defaults to `./data`)
    /// Optional: FOODNSAP_QUEUE_KEY (defaults to `offlineNutritionQueue`)
    /// Optional: FOODNSAP_FLUSH_MODE, `batch` or `per-item` (defaults to `batch`)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let data_dir = env::var("FOODNSAP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let queue_key = env::var("FOODNSAP_QUEUE_KEY").unwrap_or(defaults.queue_key);
        let flush_mode = match env::var("FOODNSAP_FLUSH_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.flush_mode,
        };

        Ok(QueueConfig {
            data_dir,
            queue_key,
            flush_mode,
        })
    }

    /// Open the file-backed queue this configuration describes.
    pub fn open_queue(&self) -> Result<OfflineQueue> {
        let storage = FileStorage::open(&self.data_dir)?;
        // Fail early on a key the storage cannot hold.
        storage.path_for(&self.queue_key)?;
        tracing::info!(
            "Opened offline queue '{}' in {} (flush mode: {})",
            self.queue_key,
            self.data_dir.display(),
            self.flush_mode
        );
        Ok(OfflineQueue::new(storage)
            .with_key(self.queue_key.clone())
            .with_mode(self.flush_mode))
    }
}
