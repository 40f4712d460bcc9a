//! Background flushing on connectivity restore.

use super::executor::MutationExecutor;
use super::offline::OfflineQueue;
use crate::connectivity::Connectivity;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Poll `connectivity` every `interval` and flush `queue` through `executor`
/// whenever it goes from offline to online, including the first poll.
///
/// A transient failure is logged and tried again on the next poll that still
/// sees the network up. Any other failure waits for the next offline to online
/// transition. Abort the returned handle to stop.
pub fn spawn_auto_flush<E, C>(
    queue: Arc<OfflineQueue>,
    executor: Arc<E>,
    connectivity: Arc<C>,
    interval: Duration,
) -> JoinHandle<()>
where
    E: MutationExecutor + ?Sized + 'static,
    C: Connectivity + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut was_online = false;

        loop {
            ticker.tick().await;
            let online = connectivity.is_online().await;
            if online && !was_online {
                match queue.flush(executor.as_ref()).await {
                    Ok(report) if report.applied > 0 => {
                        tracing::info!(
                            "[SYNC {}] replayed {} queued mutations",
                            queue.key(),
                            report.applied
                        );
                    }
                    Ok(_) => {}
                    Err(e) if e.is_transient() => {
                        tracing::warn!("[SYNC {}] flush failed, will retry: {}", queue.key(), e);
                        continue;
                    }
                    Err(e) => {
                        tracing::error!(
                            "[SYNC {}] flush failed, waiting for reconnect: {}",
                            queue.key(),
                            e
                        );
                    }
                }
            }
            was_online = online;
        }
    })
}
