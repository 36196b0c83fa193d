use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::FoodEstimate;
use crate::diary::repo_types::FoodItem;

pub const UNKNOWN_FOOD: &str = "Unknown Food";

fn amount(v: Option<f64>) -> f64 {
    // f64::max drops NaN in favour of 0.0
    v.unwrap_or(0.0).max(0.0)
}

impl FoodItem {
    /// Completes a partial estimate into a log entry with a fresh id and timestamp.
    pub fn from_estimate(estimate: FoodEstimate, image_url: Option<String>) -> Self {
        let name = estimate
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_FOOD.to_string());

        Self {
            id: Uuid::now_v7(),
            name,
            calories: amount(estimate.calories),
            protein: amount(estimate.protein),
            carbs: amount(estimate.carbs),
            fat: amount(estimate.fat),
            ingredients: estimate.ingredients.unwrap_or_default(),
            timestamp: OffsetDateTime::now_utc(),
            image_url,
        }
    }
}
