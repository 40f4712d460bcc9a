pub mod executor;
pub mod offline;
pub mod storage;
pub mod trigger;

pub use executor::{executor_fn, FnExecutor, MutationExecutor};
pub use offline::{FlushMode, FlushReport, OfflineQueue, QueueState, DEFAULT_QUEUE_KEY};
pub use storage::{DurableStorage, FileStorage, MemoryStorage};
pub use trigger::spawn_auto_flush;
