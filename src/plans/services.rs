use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::dto::{DailyMealPlan, WeeklyMealPlan};
use crate::diary::repo_types::UserProfile;
use crate::error::PlanGenerationError;
use crate::genai::{GenerateRequest, GenerativeModel, Part};

pub const DAYS_PER_WEEK: usize = 7;

pub fn daily_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "dayName": { "type": "STRING" },
            "date": { "type": "STRING" },
            "totalCalories": { "type": "NUMBER" },
            "meals": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "type": {
                            "type": "STRING",
                            "enum": ["Breakfast", "Lunch", "Dinner", "Snack"]
                        },
                        "name": { "type": "STRING" },
                        "calories": { "type": "NUMBER" },
                        "ingredients": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "macros": {
                            "type": "OBJECT",
                            "properties": {
                                "protein": { "type": "NUMBER" },
                                "carbs": { "type": "NUMBER" },
                                "fat": { "type": "NUMBER" }
                            },
                            "required": ["protein", "carbs", "fat"]
                        }
                    },
                    "required": ["type", "name", "calories", "ingredients", "macros"]
                }
            }
        },
        "required": ["dayName", "date", "totalCalories", "meals"]
    })
}

pub fn weekly_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "days": { "type": "ARRAY", "items": daily_plan_schema() }
        },
        "required": ["days"]
    })
}

fn allergy_list(profile: &UserProfile) -> String {
    let joined = profile
        .allergies
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "None".to_string()
    } else {
        joined
    }
}

fn targets(profile: &UserProfile) -> String {
    format!(
        "Calories: {}kcal, Protein: {}g, Carbs: {}g, Fat: {}g",
        profile.daily_goal, profile.protein_goal, profile.carbs_goal, profile.fat_goal
    )
}

pub fn daily_plan_prompt(profile: &UserProfile, cuisine: &str) -> String {
    format!(
        "Create a personalized meal plan for today made up ONLY of authentic {cuisine} regional \
dishes. Do not include dishes from any other cuisine.\n\
Health goal: {goal}.\n\
Daily nutritional targets: {targets}.\n\
Allergies: {allergies}.\n\
Keep portion sizes and ingredients realistic for a healthy everyday {cuisine} diet.",
        goal = profile.goal,
        targets = targets(profile),
        allergies = allergy_list(profile),
    )
}

pub fn weekly_plan_prompt(profile: &UserProfile, cuisine: &str) -> String {
    format!(
        "Create a personalized {DAYS_PER_WEEK}-day meal plan, Monday to Sunday, built from \
authentic {cuisine} specialties with plenty of variety within that cuisine.\n\
Health goal: {goal}. Daily targets: {targets}.\n\
Allergies: {allergies}.\n\
Every day must be different and balanced against the macro targets using {cuisine} ingredients.",
        goal = profile.goal,
        targets = targets(profile),
        allergies = allergy_list(profile),
    )
}

async fn generate<T: DeserializeOwned>(
    model: &dyn GenerativeModel,
    prompt: String,
    schema: Value,
) -> Result<T, PlanGenerationError> {
    let req = GenerateRequest {
        parts: vec![Part::text(prompt)],
        response_schema: schema,
    };
    let text = model
        .generate(req)
        .await
        .inspect_err(|e| error!(error = %e, "meal plan call failed"))?
        .filter(|t| !t.trim().is_empty())
        .ok_or(PlanGenerationError::EmptyResponse)?;

    serde_json::from_str(&text).map_err(|e| {
        error!(error = %e, "meal plan response does not match schema");
        PlanGenerationError::InvalidJson(e)
    })
}

pub async fn generate_daily_plan(
    model: &dyn GenerativeModel,
    profile: &UserProfile,
    cuisine: &str,
) -> Result<DailyMealPlan, PlanGenerationError> {
    let plan: DailyMealPlan =
        generate(model, daily_plan_prompt(profile, cuisine), daily_plan_schema()).await?;
    info!(day = %plan.day_name, meals = plan.meals.len(), "daily plan generated");
    Ok(plan)
}

pub async fn generate_weekly_plan(
    model: &dyn GenerativeModel,
    profile: &UserProfile,
    cuisine: &str,
) -> Result<WeeklyMealPlan, PlanGenerationError> {
    let plan: WeeklyMealPlan =
        generate(model, weekly_plan_prompt(profile, cuisine), weekly_plan_schema()).await?;
    if plan.days.len() != DAYS_PER_WEEK {
        // Day count is a prompt-level request; pass the plan through as returned.
        warn!(days = plan.days.len(), "weekly plan does not have seven days");
    }
    info!(days = plan.days.len(), "weekly plan generated");
    Ok(plan)
}

#[async_trait]
pub trait MealPlanner: Send + Sync {
    async fn daily(&self, profile: &UserProfile) -> Result<DailyMealPlan, PlanGenerationError>;
    async fn weekly(&self, profile: &UserProfile) -> Result<WeeklyMealPlan, PlanGenerationError>;
}

pub struct ModelPlanner {
    model: Arc<dyn GenerativeModel>,
    cuisine: String,
}

impl ModelPlanner {
    pub fn new(model: Arc<dyn GenerativeModel>, cuisine: impl Into<String>) -> Self {
        Self {
            model,
            cuisine: cuisine.into(),
        }
    }
}

#[async_trait]
impl MealPlanner for ModelPlanner {
    async fn daily(&self, profile: &UserProfile) -> Result<DailyMealPlan, PlanGenerationError> {
        generate_daily_plan(self.model.as_ref(), profile, &self.cuisine).await
    }

    async fn weekly(&self, profile: &UserProfile) -> Result<WeeklyMealPlan, PlanGenerationError> {
        generate_weekly_plan(self.model.as_ref(), profile, &self.cuisine).await
    }
}
