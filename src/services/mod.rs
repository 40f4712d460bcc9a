//! Domain services: the call sites that decide between writing to the backend
//! and deferring to the offline queue.

pub mod meals;
pub mod models;
pub mod mutation;
pub mod nutrition;
pub mod remote;
pub mod replay;
pub mod totals;

#[cfg(test)]
pub(crate) mod testing;

pub use meals::MealService;
pub use models::{FoodItem, LoggedMeal, Meal, MealInput, MealItem, MealRow, MealUpdate};
pub use mutation::{DomainMutation, SAVE_MEAL, UPSERT_FOOD};
pub use nutrition::NutritionService;
pub use remote::RemoteStore;
pub use replay::ReplayExecutor;
pub use totals::{meal_totals, NutritionTotals};

/// Outcome of a write that may have been deferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<T> {
    /// Applied to the backend; carries what it returned.
    Sent(T),
    /// Stored in the offline queue for a later flush.
    Queued,
}

impl<T> Delivery<T> {
    pub fn is_queued(&self) -> bool {
        matches!(self, Delivery::Queued)
    }
}
