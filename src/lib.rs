//! # foodnsap
//!
//! Offline mutation queue for the foodnsap food-logging client. Writes made
//! while the device has no connectivity are recorded in a durable, ordered
//! queue and replayed against the backend once the network comes back.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use foodnsap::queue::{executor_fn, MemoryStorage, OfflineQueue};
//! use foodnsap::QueuedMutation;
//! use serde_json::json;
//!
//! # async fn run() -> foodnsap::Result<()> {
//! let queue = OfflineQueue::new(MemoryStorage::new());
//!
//! queue
//!     .enqueue(QueuedMutation::insert("meals", json!({"name": "Salad"})))
//!     .await?;
//! queue.enqueue(QueuedMutation::delete("meals", "abc123")).await?;
//!
//! // Back online: replay in insertion order.
//! let report = queue
//!     .flush(&executor_fn(|m| async move {
//!         println!("applying {}", m);
//!         Ok::<(), foodnsap::FoodnsapError>(())
//!     }))
//!     .await?;
//! assert_eq!(report.applied, 2);
//! assert!(queue.is_empty().await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`queue`] | [`OfflineQueue`], storage backends, executors, auto flush |
//! | [`services`] | meal and nutrition services that queue while offline |
//! | [`connectivity`] | online/offline signal |
//! | [`config`] | environment driven queue setup |
//!
//! The HTTP backend lives in the `foodnsap-remote` crate and the command line
//! tool in `foodnsap-cli`.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod queue;
pub mod services;
pub mod types;

pub use config::QueueConfig;
pub use connectivity::{Connectivity, ConnectivityFlag};
pub use error::{FoodnsapError, Result};
pub use queue::{
    executor_fn, spawn_auto_flush, DurableStorage, FileStorage, FlushMode, FlushReport,
    MemoryStorage, MutationExecutor, OfflineQueue, QueueState, DEFAULT_QUEUE_KEY,
};
pub use services::{Delivery, MealService, NutritionService, RemoteStore, ReplayExecutor};
pub use types::{MutationKind, QueuedMutation};
