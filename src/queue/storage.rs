//! Key-value persistence behind the offline queue.

use crate::error::{FoodnsapError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Durable string store addressed by key.
///
/// `set` must replace the value in a single step: a reader never observes a
/// half-written value.
#[async_trait]
pub trait DurableStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<S: DurableStorage + ?Sized> DurableStorage for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
}

/// In-process storage. Clones share the same map, so a second handle behaves
/// like the same device storage seen from a fresh process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .lock()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }

    fn with_map<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| FoodnsapError::Storage("memory storage lock poisoned".to_string()))?;
        Ok(f(&mut map))
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_map(|map| map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.with_map(|map| {
            map.insert(key.to_string(), value);
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.with_map(|map| {
            map.remove(key);
        })
    }
}

/// One file per key under a directory: `{dir}/{key}.json`.
///
/// Writes go to a temp file in the same directory which is then renamed over
/// the target, so the previous value survives a crash mid-write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| FoodnsapError::Storage(format!("create {}: {}", dir.display(), e)))?;
        Ok(FileStorage {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(FoodnsapError::Storage(format!(
                "invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FoodnsapError::Storage(format!("storage task failed: {}", e)))?
}

#[async_trait]
impl DurableStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        blocking(move || match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FoodnsapError::Storage(format!(
                "read {}: {}",
                path.display(),
                e
            ))),
        })
        .await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        blocking(move || {
            let storage_err =
                |e: std::io::Error| FoodnsapError::Storage(format!("write {}: {}", path.display(), e));
            let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(storage_err)?;
            tmp.write_all(value.as_bytes()).map_err(storage_err)?;
            tmp.as_file().sync_all().map_err(storage_err)?;
            tmp.persist(&path).map_err(|e| storage_err(e.error))?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        blocking(move || match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FoodnsapError::Storage(format!(
                "remove {}: {}",
                path.display(),
                e
            ))),
        })
        .await
    }
}
