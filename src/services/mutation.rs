//! Typed view over queued mutations.
//!
//! The queue stores `payload` as opaque JSON. Each kind has a fixed contract
//! here, checked when an entry is decoded for replay.

use super::models::{FoodItem, LoggedMeal, FOOD_ITEMS_TABLE, MEALS_TABLE};
use crate::error::{FoodnsapError, Result};
use crate::types::{MutationKind, QueuedMutation};
use serde_json::Value;

pub const UPSERT_FOOD: &str = "upsertFood";
pub const SAVE_MEAL: &str = "saveMeal";

#[derive(Debug, Clone, PartialEq)]
pub enum DomainMutation {
    InsertRow { table: String, row: Value },
    UpdateRow { table: String, id: String, changes: Value },
    DeleteRow { table: String, id: String },
    UpsertFood(FoodItem),
    SaveMeal(LoggedMeal),
}

impl DomainMutation {
    pub fn into_queued(self) -> Result<QueuedMutation> {
        Ok(match self {
            DomainMutation::InsertRow { table, row } => QueuedMutation::insert(table, row),
            DomainMutation::UpdateRow { table, id, changes } => {
                QueuedMutation::update(table, id, changes)
            }
            DomainMutation::DeleteRow { table, id } => QueuedMutation::delete(table, id),
            DomainMutation::UpsertFood(food) => {
                QueuedMutation::action(UPSERT_FOOD, FOOD_ITEMS_TABLE, serde_json::to_value(food)?)
            }
            DomainMutation::SaveMeal(meal) => {
                QueuedMutation::action(SAVE_MEAL, MEALS_TABLE, serde_json::to_value(meal)?)
            }
        })
    }
}

impl TryFrom<&QueuedMutation> for DomainMutation {
    type Error = FoodnsapError;

    fn try_from(m: &QueuedMutation) -> Result<Self> {
        match &m.kind {
            MutationKind::Insert => Ok(DomainMutation::InsertRow {
                table: require_target(m)?,
                row: require_object(m)?,
            }),
            MutationKind::Update => Ok(DomainMutation::UpdateRow {
                table: require_target(m)?,
                id: require_identifier(m)?,
                changes: require_object(m)?,
            }),
            MutationKind::Delete => Ok(DomainMutation::DeleteRow {
                table: require_target(m)?,
                id: require_identifier(m)?,
            }),
            MutationKind::Action(tag) if tag == UPSERT_FOOD => {
                Ok(DomainMutation::UpsertFood(decode_payload(m)?))
            }
            MutationKind::Action(tag) if tag == SAVE_MEAL => {
                Ok(DomainMutation::SaveMeal(decode_payload(m)?))
            }
            MutationKind::Action(tag) => Err(FoodnsapError::InvalidMutation(format!(
                "unknown action '{}'",
                tag
            ))),
        }
    }
}

impl TryFrom<QueuedMutation> for DomainMutation {
    type Error = FoodnsapError;

    fn try_from(m: QueuedMutation) -> Result<Self> {
        DomainMutation::try_from(&m)
    }
}

fn require_target(m: &QueuedMutation) -> Result<String> {
    if m.target.is_empty() {
        return Err(FoodnsapError::InvalidMutation(format!(
            "{} has no target table",
            m.kind
        )));
    }
    Ok(m.target.clone())
}

fn require_identifier(m: &QueuedMutation) -> Result<String> {
    match m.identifier.as_deref() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(FoodnsapError::InvalidMutation(format!(
            "{} on '{}' needs a record id",
            m.kind, m.target
        ))),
    }
}

fn require_object(m: &QueuedMutation) -> Result<Value> {
    match &m.payload {
        Some(v @ Value::Object(_)) => Ok(v.clone()),
        _ => Err(FoodnsapError::InvalidMutation(format!(
            "{} on '{}' needs an object payload",
            m.kind, m.target
        ))),
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(m: &QueuedMutation) -> Result<T> {
    let payload = m.payload.clone().ok_or_else(|| {
        FoodnsapError::InvalidMutation(format!("{} has no payload", m.kind))
    })?;
    serde_json::from_value(payload)
        .map_err(|e| FoodnsapError::InvalidMutation(format!("{} payload: {}", m.kind, e)))
}
