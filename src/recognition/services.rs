use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::dto::FoodEstimate;
use crate::error::RecognitionError;
use crate::genai::{GenerateRequest, GenerativeModel, Part};
use crate::images::services::JPEG_MIME;

const RECOGNITION_PROMPT: &str = "Identify the dish in this photo, paying close attention to \
regional and cultural cuisines: name global and local specialties precisely (for example South \
Indian dishes such as dosa, idli or sambar, or international foods such as sushi or tacos). \
Estimate the total calories of the portion shown and list its main ingredients, including \
characteristic regional spices. Give protein, carbohydrate and fat estimates in grams based on \
the standard preparation of the dish.";

pub fn food_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING", "description": "Common or traditional name of the dish" },
            "calories": { "type": "NUMBER", "description": "Total calorie estimate" },
            "protein": { "type": "NUMBER", "description": "Protein in grams" },
            "carbs": { "type": "NUMBER", "description": "Carbohydrates in grams" },
            "fat": { "type": "NUMBER", "description": "Fat in grams" },
            "ingredients": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Identified ingredients, including regional spices or components"
            }
        },
        "required": ["name", "calories", "protein", "carbs", "fat", "ingredients"]
    })
}

/// Model reply as the schema requires it: every field present and typed.
#[derive(Debug, Deserialize)]
struct RecognizedFood {
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    ingredients: Vec<String>,
}

impl From<RecognizedFood> for FoodEstimate {
    fn from(food: RecognizedFood) -> Self {
        Self {
            name: Some(food.name),
            calories: Some(food.calories),
            protein: Some(food.protein),
            carbs: Some(food.carbs),
            fat: Some(food.fat),
            ingredients: Some(food.ingredients),
        }
    }
}

/// Derives a structured food estimate from a photo.
#[async_trait]
pub trait FoodRecognizer: Send + Sync {
    /// `image_b64` is a base64 JPEG without a data-URL prefix.
    async fn recognize(&self, image_b64: &str) -> Result<FoodEstimate, RecognitionError>;
}

pub struct ModelRecognizer {
    model: Arc<dyn GenerativeModel>,
}

impl ModelRecognizer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl FoodRecognizer for ModelRecognizer {
    async fn recognize(&self, image_b64: &str) -> Result<FoodEstimate, RecognitionError> {
        recognize_food(self.model.as_ref(), image_b64).await
    }
}

pub async fn recognize_food(
    model: &dyn GenerativeModel,
    image_b64: &str,
) -> Result<FoodEstimate, RecognitionError> {
    let req = GenerateRequest {
        parts: vec![Part::inline(JPEG_MIME, image_b64), Part::text(RECOGNITION_PROMPT)],
        response_schema: food_schema(),
    };

    let text = model
        .generate(req)
        .await
        .inspect_err(|e| error!(error = %e, "food recognition call failed"))?
        .filter(|t| !t.trim().is_empty())
        .ok_or(RecognitionError::EmptyResponse)?;

    let food: RecognizedFood = serde_json::from_str(&text).map_err(|e| {
        error!(error = %e, "food recognition returned invalid JSON");
        RecognitionError::InvalidJson(e)
    })?;
    debug!(name = %food.name, calories = food.calories, "food recognized");
    Ok(food.into())
}
