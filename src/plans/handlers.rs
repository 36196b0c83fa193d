use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{error, instrument};

use super::dto::{DailyMealPlan, WeeklyMealPlan};
use crate::state::AppState;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans/daily", post(daily_plan))
        .route("/plans/weekly", post(weekly_plan))
}

/// POST /plans/daily, planned against the stored profile
#[instrument(skip(state))]
pub async fn daily_plan(
    State(state): State<AppState>,
) -> Result<Json<DailyMealPlan>, (StatusCode, String)> {
    let profile = state.diary.read().await.profile().clone();
    state.planner.daily(&profile).await.map(Json).map_err(|e| {
        error!(error = %e, "daily plan failed");
        e.into()
    })
}

#[instrument(skip(state))]
pub async fn weekly_plan(
    State(state): State<AppState>,
) -> Result<Json<WeeklyMealPlan>, (StatusCode, String)> {
    let profile = state.diary.read().await.profile().clone();
    state.planner.weekly(&profile).await.map(Json).map_err(|e| {
        error!(error = %e, "weekly plan failed");
        e.into()
    })
}
