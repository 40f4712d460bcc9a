use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const MEALS_TABLE: &str = "meals";
pub const MEAL_ITEMS_TABLE: &str = "meal_items";
pub const FOOD_ITEMS_TABLE: &str = "food_items";

/// A meal as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub meal_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    pub created_at: String,
}

impl Meal {
    pub const OFFLINE_USER: &'static str = "offline";

    /// Stand-in returned to the caller when the insert was queued instead of
    /// sent.
    pub fn offline_placeholder(row: &MealRow, now: DateTime<Utc>) -> Self {
        Meal {
            id: format!("offline-{}", now.timestamp_millis()),
            user_id: Self::OFFLINE_USER.to_string(),
            name: row.name.clone(),
            image_url: row.image_url.clone(),
            meal_time: row.meal_time.clone(),
            calories: Some(row.calories),
            protein: Some(row.protein),
            carbs: Some(row.carbs),
            fat: Some(row.fat),
            created_at: rfc3339(now),
        }
    }

    /// Ids minted on the device never exist remotely.
    pub fn is_local_id(id: &str) -> bool {
        id.starts_with("local_") || id.starts_with("offline-")
    }
}

/// Data for a new meal; missing fields are filled in by [`MealInput::sanitize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

impl MealInput {
    pub fn new(name: impl Into<String>) -> Self {
        MealInput {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Keep only the columns the `meals` table has, defaulting the meal time to
    /// `now` and missing macros to zero.
    pub fn sanitize(self, now: DateTime<Utc>) -> MealRow {
        MealRow {
            name: self.name,
            image_url: self.image_url,
            meal_time: self.meal_time.unwrap_or_else(|| rfc3339(now)),
            calories: self.calories.unwrap_or(0.0),
            protein: self.protein.unwrap_or(0.0),
            carbs: self.carbs.unwrap_or(0.0),
            fat: self.fat.unwrap_or(0.0),
        }
    }
}

/// Row sent to the `meals` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub meal_time: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Partial update of a meal; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        FoodItem {
            id: None,
            user_id: None,
            name: name.into(),
            calories,
            protein,
            carbs,
            fat,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// One food in a logged meal. `portion_mult` scales the food's macros:
/// 0.5 is half a portion, 2.0 a double one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub food_id: String,
    pub portion_mult: f64,
}

/// A meal assembled from food items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggedMeal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_time: Option<String>,
    #[serde(default)]
    pub items: Vec<MealItem>,
}

pub(crate) fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
