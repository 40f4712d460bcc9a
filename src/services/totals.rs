use super::models::{FoodItem, MealItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Sum the macros of `items`, each scaled by its portion multiplier. Items
/// whose food is not in `foods` are skipped.
pub fn meal_totals(foods: &HashMap<String, FoodItem>, items: &[MealItem]) -> NutritionTotals {
    items
        .iter()
        .filter_map(|item| foods.get(&item.food_id).map(|food| (food, item.portion_mult)))
        .fold(NutritionTotals::default(), |mut acc, (food, mult)| {
            acc.calories += food.calories * mult;
            acc.protein += food.protein * mult;
            acc.carbs += food.carbs * mult;
            acc.fat += food.fat * mult;
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pantry() -> HashMap<String, FoodItem> {
        let mut foods = HashMap::new();
        foods.insert("rice".to_string(), FoodItem::new("Rice", 200.0, 4.0, 44.0, 0.5));
        foods.insert("egg".to_string(), FoodItem::new("Egg", 78.0, 6.0, 0.5, 5.0));
        foods
    }

    fn item(food_id: &str, portion_mult: f64) -> MealItem {
        MealItem {
            food_id: food_id.to_string(),
            portion_mult,
        }
    }

    #[test]
    fn test_scales_by_portion() {
        let totals = meal_totals(&pantry(), &[item("rice", 0.5), item("egg", 2.0)]);
        assert_eq!(totals.calories, 100.0 + 156.0);
        assert_eq!(totals.protein, 2.0 + 12.0);
        assert_eq!(totals.carbs, 22.0 + 1.0);
        assert_eq!(totals.fat, 0.25 + 10.0);
    }

    #[test]
    fn test_unknown_food_is_skipped() {
        let totals = meal_totals(&pantry(), &[item("egg", 1.0), item("unicorn", 3.0)]);
        assert_eq!(totals.calories, 78.0);
    }

    #[test]
    fn test_empty_meal() {
        assert_eq!(meal_totals(&pantry(), &[]), NutritionTotals::default());
    }
}
