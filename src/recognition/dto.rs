use serde::{Deserialize, Serialize};

/// What the model reported for one photo; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodEstimate {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub ingredients: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ScanBase64Request {
    pub image_b64: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub estimate: FoodEstimate,
    /// Data URL of the normalized photo, for preview and as the entry's image.
    pub image_url: String,
    pub width: u32,
    pub height: u32,
}
