use super::mutation::DomainMutation;
use super::nutrition::{write_food, write_logged_meal};
use super::remote::RemoteStore;
use crate::error::Result;
use crate::queue::MutationExecutor;
use crate::types::QueuedMutation;
use async_trait::async_trait;
use std::sync::Arc;

/// Executor that applies queued entries straight to the remote store.
///
/// It never checks connectivity and never enqueues, so a replay cannot feed
/// the queue it is draining.
pub struct ReplayExecutor {
    store: Arc<dyn RemoteStore>,
}

impl ReplayExecutor {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        ReplayExecutor { store }
    }

    pub async fn apply(&self, mutation: DomainMutation) -> Result<()> {
        let store = self.store.as_ref();
        match mutation {
            DomainMutation::InsertRow { table, row } => store.insert(&table, row).await.map(drop),
            DomainMutation::UpdateRow { table, id, changes } => {
                store.update(&table, &id, changes).await.map(drop)
            }
            DomainMutation::DeleteRow { table, id } => store.delete(&table, &id).await,
            DomainMutation::UpsertFood(food) => write_food(store, &food).await,
            DomainMutation::SaveMeal(meal) => write_logged_meal(store, &meal).await.map(drop),
        }
    }
}

#[async_trait]
impl MutationExecutor for ReplayExecutor {
    async fn execute(&self, mutation: &QueuedMutation) -> Result<()> {
        let decoded = DomainMutation::try_from(mutation)?;
        tracing::debug!("replaying {}", mutation);
        self.apply(decoded).await
    }
}
