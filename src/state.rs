use crate::config::AppConfig;
use crate::diary::repo::Diary;
use crate::diary::repo_types::UserProfile;
use crate::genai::{Gemini, GenerativeModel};
use crate::plans::services::{MealPlanner, ModelPlanner};
use crate::recognition::services::{FoodRecognizer, ModelRecognizer};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub recognizer: Arc<dyn FoodRecognizer>,
    pub planner: Arc<dyn MealPlanner>,
    pub diary: Arc<RwLock<Diary>>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let model = Arc::new(Gemini::new(config.gemini.clone())) as Arc<dyn GenerativeModel>;
        tracing::info!(model = %config.gemini.model, "generative model configured");
        Ok(Self::from_parts(config, model))
    }

    pub fn from_parts(config: Arc<AppConfig>, model: Arc<dyn GenerativeModel>) -> Self {
        let recognizer = Arc::new(ModelRecognizer::new(model.clone())) as Arc<dyn FoodRecognizer>;
        let planner =
            Arc::new(ModelPlanner::new(model, config.plan_cuisine.clone())) as Arc<dyn MealPlanner>;
        Self {
            config,
            recognizer,
            planner,
            diary: Arc::new(RwLock::new(Diary::new(UserProfile::default()))),
        }
    }

    #[cfg(test)]
    pub fn fake(model: Arc<dyn GenerativeModel>) -> Self {
        use crate::config::{GeminiConfig, ImageConfig};

        let config = Arc::new(AppConfig {
            gemini: GeminiConfig {
                api_key: "test".into(),
                model: "fake".into(),
                base_url: "http://fake.local".into(),
            },
            image: ImageConfig::default(),
            max_upload_bytes: 5 * 1024 * 1024,
            plan_cuisine: "Indian Tamil Nadu".into(),
        });
        Self::from_parts(config, model)
    }
}
