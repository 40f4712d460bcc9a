use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Network reachability signal consumed by the services and the auto-flush
/// task.
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_online(&self) -> bool;
}

#[async_trait]
impl<C: Connectivity + ?Sized> Connectivity for Arc<C> {
    async fn is_online(&self) -> bool {
        (**self).is_online().await
    }
}

/// Shared on/off switch. Clones observe the same state, so the app shell can
/// flip it from its network listener while services read it.
#[derive(Debug, Clone)]
pub struct ConnectivityFlag {
    online: Arc<AtomicBool>,
}

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        ConnectivityFlag {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn offline() -> Self {
        Self::new(false)
    }

    /// Returns the previous value.
    pub fn set_online(&self, online: bool) -> bool {
        let prev = self.online.swap(online, Ordering::SeqCst);
        if prev != online {
            tracing::info!(
                "connectivity changed: {}",
                if online { "online" } else { "offline" }
            );
        }
        prev
    }

    pub fn get(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::online()
    }
}

#[async_trait]
impl Connectivity for ConnectivityFlag {
    async fn is_online(&self) -> bool {
        self.get()
    }
}
