use super::models::{FoodItem, LoggedMeal, FOOD_ITEMS_TABLE, MEALS_TABLE, MEAL_ITEMS_TABLE};
use super::mutation::DomainMutation;
use super::remote::RemoteStore;
use super::replay::ReplayExecutor;
use super::Delivery;
use crate::connectivity::Connectivity;
use crate::error::{FoodnsapError, Result};
use crate::queue::{FlushReport, OfflineQueue};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Food items and meals built from them.
pub struct NutritionService {
    store: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
    queue: Arc<OfflineQueue>,
}

impl NutritionService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
        queue: Arc<OfflineQueue>,
    ) -> Self {
        NutritionService {
            store,
            connectivity,
            queue,
        }
    }

    pub fn queue(&self) -> &Arc<OfflineQueue> {
        &self.queue
    }

    /// Insert or update a food item.
    pub async fn upsert_food(&self, food: FoodItem) -> Result<Delivery<()>> {
        if !self.connectivity.is_online().await {
            self.queue
                .enqueue(DomainMutation::UpsertFood(food).into_queued()?)
                .await?;
            return Ok(Delivery::Queued);
        }
        write_food(self.store.as_ref(), &food).await?;
        Ok(Delivery::Sent(()))
    }

    /// Create a meal and one `meal_items` row per item. Returns the new meal
    /// id when sent.
    pub async fn save_meal(&self, meal: LoggedMeal) -> Result<Delivery<String>> {
        if !self.connectivity.is_online().await {
            self.queue
                .enqueue(DomainMutation::SaveMeal(meal).into_queued()?)
                .await?;
            return Ok(Delivery::Queued);
        }
        let id = write_logged_meal(self.store.as_ref(), &meal).await?;
        Ok(Delivery::Sent(id))
    }

    /// Replay everything queued while offline. Call on app resume and when the
    /// network comes back.
    pub async fn flush_offline(&self) -> Result<FlushReport> {
        let executor = ReplayExecutor::new(Arc::clone(&self.store));
        self.queue.flush(&executor).await
    }
}

pub(crate) async fn write_food(store: &dyn RemoteStore, food: &FoodItem) -> Result<()> {
    store
        .upsert(FOOD_ITEMS_TABLE, serde_json::to_value(food)?)
        .await
}

pub(crate) async fn write_logged_meal(store: &dyn RemoteStore, meal: &LoggedMeal) -> Result<String> {
    let mut header = Map::new();
    if let Some(meal_time) = &meal.meal_time {
        header.insert("meal_time".to_string(), Value::String(meal_time.clone()));
    }
    let stored = store.insert(MEALS_TABLE, Value::Object(header)).await?;
    let meal_id = stored
        .get("id")
        .and_then(id_string)
        .ok_or_else(|| FoodnsapError::Json("insert into meals returned no id".to_string()))?;

    if !meal.items.is_empty() {
        let rows = meal
            .items
            .iter()
            .map(|item| {
                json!({
                    "meal_id": meal_id,
                    "food_id": item.food_id,
                    "portion_mult": item.portion_mult,
                })
            })
            .collect();
        store.insert_many(MEAL_ITEMS_TABLE, rows).await?;
    }

    tracing::debug!("saved meal {} with {} items", meal_id, meal.items.len());
    Ok(meal_id)
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
