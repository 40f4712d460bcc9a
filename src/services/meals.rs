use super::models::{Meal, MealInput, MealUpdate, MEALS_TABLE};
use super::remote::RemoteStore;
use crate::connectivity::Connectivity;
use crate::error::{FoodnsapError, Result};
use crate::queue::OfflineQueue;
use crate::types::{MutationKind, QueuedMutation};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

/// Meals logged from a photo analysis. Writes made while offline go to the
/// shared offline queue as plain row operations on `meals`.
pub struct MealService {
    store: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
    queue: Arc<OfflineQueue>,
}

impl MealService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
        queue: Arc<OfflineQueue>,
    ) -> Self {
        MealService {
            store,
            connectivity,
            queue,
        }
    }

    pub fn queue(&self) -> &Arc<OfflineQueue> {
        &self.queue
    }

    /// Save a new meal. Offline, the insert is queued and a placeholder meal
    /// with an `offline-` id is returned. The queued insert carries that id so
    /// later edits of the placeholder can find it; replay never sends it.
    pub async fn save_meal(&self, input: MealInput) -> Result<Meal> {
        let now = Utc::now();
        let row = input.sanitize(now);

        if !self.connectivity.is_online().await {
            let placeholder = Meal::offline_placeholder(&row, now);
            self.queue
                .enqueue(QueuedMutation::new(
                    MutationKind::Insert,
                    MEALS_TABLE,
                    Some(placeholder.id.clone()),
                    Some(serde_json::to_value(&row)?),
                ))
                .await?;
            return Ok(placeholder);
        }

        let stored = self
            .store
            .insert(MEALS_TABLE, serde_json::to_value(&row)?)
            .await?;
        Ok(serde_json::from_value(stored)?)
    }

    /// Returns `None` when the update was queued.
    ///
    /// A placeholder id is never sent: the changes are merged into the queued
    /// insert that minted it, whatever the connectivity. A placeholder with no
    /// queued insert is rejected with `InvalidMutation`.
    pub async fn update_meal(&self, id: &str, update: MealUpdate) -> Result<Option<Meal>> {
        let changes = serde_json::to_value(&update)?;

        if Meal::is_local_id(id) {
            self.amend_queued_insert(id, changes).await?;
            return Ok(None);
        }

        if !self.connectivity.is_online().await {
            self.queue
                .enqueue(QueuedMutation::update(MEALS_TABLE, id, changes))
                .await?;
            return Ok(None);
        }

        let stored = self.store.update(MEALS_TABLE, id, changes).await?;
        Ok(Some(serde_json::from_value(stored)?))
    }

    /// Returns `true` once the delete was sent or queued.
    ///
    /// Deleting a placeholder drops its queued writes instead and returns
    /// whether there were any.
    pub async fn delete_meal(&self, id: &str) -> Result<bool> {
        if Meal::is_local_id(id) {
            let dropped = self
                .queue
                .rewrite(|items| {
                    let before = items.len();
                    items.retain(|m| !targets_meal(m, id));
                    before - items.len()
                })
                .await?;
            return Ok(dropped > 0);
        }

        if !self.connectivity.is_online().await {
            self.queue
                .enqueue(QueuedMutation::delete(MEALS_TABLE, id))
                .await?;
            return Ok(true);
        }

        self.store.delete(MEALS_TABLE, id).await?;
        Ok(true)
    }

    async fn amend_queued_insert(&self, id: &str, changes: Value) -> Result<()> {
        let amended = self
            .queue
            .rewrite(|items| {
                let row = items
                    .iter_mut()
                    .rev()
                    .find(|m| m.kind == MutationKind::Insert && targets_meal(m, id))
                    .and_then(|m| m.payload.as_mut())
                    .and_then(Value::as_object_mut);
                match (row, changes) {
                    (Some(row), Value::Object(fields)) => {
                        row.extend(fields);
                        true
                    }
                    _ => false,
                }
            })
            .await?;
        if !amended {
            return Err(FoodnsapError::InvalidMutation(format!(
                "meal {} has no queued insert on this device",
                id
            )));
        }
        Ok(())
    }

    /// Ids minted on the device are answered locally with `None`.
    pub async fn get_meal(&self, id: &str) -> Result<Option<Meal>> {
        if Meal::is_local_id(id) {
            return Ok(None);
        }
        match self.store.fetch(MEALS_TABLE, id).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}

fn targets_meal(m: &QueuedMutation, id: &str) -> bool {
    m.target == MEALS_TABLE && m.identifier.as_deref() == Some(id)
}
