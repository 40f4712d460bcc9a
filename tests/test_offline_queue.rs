mod common;

use common::{FlakyStorage, RecordingExecutor};
use foodnsap::{
    DurableStorage, FileStorage, FlushMode, FlushReport, FoodnsapError, MemoryStorage,
    MutationKind, OfflineQueue, QueueConfig, QueueState, QueuedMutation, DEFAULT_QUEUE_KEY,
};
use serde_json::json;
use tempfile::TempDir;

fn salad() -> QueuedMutation {
    QueuedMutation::insert("meals", json!({"name": "Salad", "calories": 300}))
}

fn three() -> Vec<QueuedMutation> {
    vec![
        QueuedMutation::insert("meals", json!({"name": "Oats"})),
        QueuedMutation::update("meals", "m-1", json!({"calories": 410})),
        QueuedMutation::delete("meals", "m-2"),
    ]
}

#[tokio::test]
async fn scenario_insert_then_delete() {
    let storage = MemoryStorage::new();
    let queue = OfflineQueue::new(storage.clone());

    queue.enqueue(salad()).await.unwrap();
    queue
        .enqueue(QueuedMutation::delete("meals", "abc123"))
        .await
        .unwrap();

    let executor = RecordingExecutor::new();
    let report = queue.flush(&executor).await.unwrap();
    assert_eq!(report, FlushReport { applied: 2 });

    let calls = executor.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].kind, MutationKind::Insert);
    assert_eq!(calls[0].target, "meals");
    assert_eq!(
        calls[0].payload,
        Some(json!({"name": "Salad", "calories": 300}))
    );
    assert_eq!(calls[1].kind, MutationKind::Delete);
    assert_eq!(calls[1].identifier.as_deref(), Some("abc123"));

    assert!(!storage.contains_key(DEFAULT_QUEUE_KEY));
}

#[tokio::test]
async fn fifo_order_is_preserved() {
    let queue = OfflineQueue::new(MemoryStorage::new());
    let mut expected = Vec::new();
    for i in 0..20 {
        let m = QueuedMutation::update("food_items", format!("f-{}", i), json!({"rank": i}));
        expected.push(m.to_string());
        queue.enqueue(m).await.unwrap();
    }

    let executor = RecordingExecutor::new();
    queue.flush(&executor).await.unwrap();
    assert_eq!(executor.labels(), expected);
}

#[tokio::test]
async fn empty_flush_is_a_no_op() {
    let storage = MemoryStorage::new();
    let queue = OfflineQueue::new(storage.clone());

    let executor = RecordingExecutor::new();
    assert_eq!(queue.flush(&executor).await.unwrap(), FlushReport::default());
    assert!(executor.calls().is_empty());
    assert!(!storage.contains_key(DEFAULT_QUEUE_KEY));

    queue.enqueue(salad()).await.unwrap();
    queue.flush(&RecordingExecutor::new()).await.unwrap();

    let spy = RecordingExecutor::new();
    queue.flush(&spy).await.unwrap();
    assert!(spy.calls().is_empty());
    assert!(!storage.contains_key(DEFAULT_QUEUE_KEY));
}

#[tokio::test]
async fn successful_flush_drains_queue() {
    let queue = OfflineQueue::new(MemoryStorage::new());
    queue.enqueue_all(three()).await.unwrap();
    assert_eq!(queue.state().await.unwrap(), QueueState::NonEmpty(3));

    queue.flush(&RecordingExecutor::new()).await.unwrap();
    assert_eq!(queue.state().await.unwrap(), QueueState::Empty);

    let spy = RecordingExecutor::new();
    queue.flush(&spy).await.unwrap();
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn failed_batch_flush_retries_everything() {
    let queue = OfflineQueue::new(MemoryStorage::new());
    assert_eq!(queue.mode(), FlushMode::Batch);
    queue.enqueue_all(three()).await.unwrap();
    let originals = queue.pending().await.unwrap();

    let failing = RecordingExecutor::failing_on(2);
    let err = queue.flush(&failing).await.unwrap_err();
    assert!(matches!(
        err,
        FoodnsapError::Executor {
            position: 1,
            remaining: 3,
            retryable: true,
            ..
        }
    ));
    assert_eq!(failing.calls().len(), 2);
    assert_eq!(queue.pending().await.unwrap(), originals);

    let retry = RecordingExecutor::new();
    let report = queue.flush(&retry).await.unwrap();
    assert_eq!(report.applied, 3);
    // The first entry is applied a second time.
    assert_eq!(retry.calls(), originals);
    assert!(queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn failed_per_item_flush_retries_remainder() {
    let queue = OfflineQueue::new(MemoryStorage::new()).with_mode(FlushMode::PerItem);
    queue.enqueue_all(three()).await.unwrap();
    let originals = queue.pending().await.unwrap();

    let failing = RecordingExecutor::failing_on(2);
    let err = queue.flush(&failing).await.unwrap_err();
    assert!(matches!(
        err,
        FoodnsapError::Executor {
            position: 1,
            remaining: 2,
            ..
        }
    ));
    assert_eq!(queue.pending().await.unwrap(), originals[1..].to_vec());

    let retry = RecordingExecutor::new();
    let report = queue.flush(&retry).await.unwrap();
    assert_eq!(report, FlushReport { applied: 2 });
    assert_eq!(retry.calls(), originals[1..].to_vec());
}

#[tokio::test]
async fn enqueued_mutation_survives_restart_in_memory() {
    let storage = MemoryStorage::new();
    {
        let queue = OfflineQueue::new(storage.clone());
        queue.enqueue(salad()).await.unwrap();
    }

    let reopened = OfflineQueue::new(storage);
    let pending = reopened.pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payload.as_ref().unwrap()["name"], "Salad");
}

#[tokio::test]
async fn enqueued_mutation_survives_restart_on_disk() {
    let tmp = TempDir::new().unwrap();
    {
        let queue = OfflineQueue::new(FileStorage::open(tmp.path()).unwrap());
        queue.enqueue(salad()).await.unwrap();
        queue
            .enqueue(QueuedMutation::delete("meals", "abc123"))
            .await
            .unwrap();
    }

    let raw = std::fs::read_to_string(tmp.path().join("offlineNutritionQueue.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0]["type"], "INSERT");
    assert_eq!(stored[0]["table"], "meals");
    assert_eq!(stored[1]["id"], "abc123");

    let reopened = OfflineQueue::new(FileStorage::open(tmp.path()).unwrap());
    let executor = RecordingExecutor::new();
    reopened.flush(&executor).await.unwrap();
    assert_eq!(executor.labels(), vec!["INSERT meals", "DELETE meals/abc123"]);
    assert!(!tmp.path().join("offlineNutritionQueue.json").exists());
}

#[tokio::test]
async fn legacy_entries_load() {
    let storage = MemoryStorage::new();
    storage
        .set(
            DEFAULT_QUEUE_KEY,
            r#"[
                {"type":"INSERT","table":"meals","data":{"name":"Toast"}},
                {"type":"upsertFood","payload":{"name":"Rice"}}
            ]"#
            .to_string(),
        )
        .await
        .unwrap();

    let pending = OfflineQueue::new(storage).pending().await.unwrap();
    assert_eq!(pending[0].kind, MutationKind::Insert);
    assert_eq!(pending[0].enqueued_at_ms, 0);
    assert_eq!(pending[1].kind, MutationKind::Action("upsertFood".into()));
    assert_eq!(pending[1].target, "");
    assert_eq!(pending[1].payload.as_ref().unwrap()["name"], "Rice");
}

#[tokio::test]
async fn unreadable_queue_fails_loudly_until_reset() {
    let storage = MemoryStorage::new();
    storage
        .set(DEFAULT_QUEUE_KEY, "{not json".to_string())
        .await
        .unwrap();
    let queue = OfflineQueue::new(storage.clone());

    assert!(matches!(
        queue.enqueue(salad()).await,
        Err(FoodnsapError::Serialization(_))
    ));
    let executor = RecordingExecutor::new();
    assert!(matches!(
        queue.flush(&executor).await,
        Err(FoodnsapError::Serialization(_))
    ));
    assert!(executor.calls().is_empty());
    assert_eq!(
        storage.get(DEFAULT_QUEUE_KEY).await.unwrap().as_deref(),
        Some("{not json")
    );

    queue.reset().await.unwrap();
    assert_eq!(queue.enqueue(salad()).await.unwrap(), 1);
}

#[tokio::test]
async fn storage_failure_on_enqueue_keeps_prior_state() {
    let storage = FlakyStorage::new();
    let queue = OfflineQueue::new(storage.clone());
    queue.enqueue(salad()).await.unwrap();

    storage.fail_writes(true);
    let err = queue
        .enqueue(QueuedMutation::delete("meals", "abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, FoodnsapError::Storage(_)));
    assert!(err.is_transient());

    storage.fail_writes(false);
    let pending = queue.pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, MutationKind::Insert);
}

#[tokio::test]
async fn storage_failure_on_clear_keeps_queue() {
    let storage = FlakyStorage::new();
    let queue = OfflineQueue::new(storage.clone());
    queue.enqueue_all(three()).await.unwrap();

    storage.fail_writes(true);
    let executor = RecordingExecutor::new();
    let err = queue.flush(&executor).await.unwrap_err();
    assert!(matches!(err, FoodnsapError::Storage(_)));
    assert_eq!(executor.calls().len(), 3);

    storage.fail_writes(false);
    assert_eq!(queue.len().await.unwrap(), 3);
}

#[tokio::test]
async fn config_opens_file_queue() {
    let tmp = TempDir::new().unwrap();
    let config = QueueConfig {
        data_dir: tmp.path().join("queue"),
        queue_key: "nutrition-test".to_string(),
        flush_mode: FlushMode::PerItem,
    };
    let queue = config.open_queue().unwrap();
    assert_eq!(queue.key(), "nutrition-test");
    assert_eq!(queue.mode(), FlushMode::PerItem);

    queue.enqueue(salad()).await.unwrap();
    assert!(tmp.path().join("queue").join("nutrition-test.json").exists());
}
