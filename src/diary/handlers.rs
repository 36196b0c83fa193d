use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{Dashboard, DayCalories, LogItemRequest, WaterResponse};
use super::repo_types::{FoodItem, ProfileUpdate, UserProfile};
use crate::state::AppState;

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/diary/items", get(list_items).post(log_item))
        .route("/diary/items/:id", get(get_item).delete(delete_item))
        .route("/diary/stats", get(today_stats))
        .route("/diary/week", get(week_trend))
        .route("/diary/water", post(add_water).delete(remove_water))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).patch(update_profile))
}

fn today() -> time::Date {
    OffsetDateTime::now_utc().date()
}

/// POST /diary/items { estimate, image_url? }
#[instrument(skip(state, body))]
pub async fn log_item(
    State(state): State<AppState>,
    Json(body): Json<LogItemRequest>,
) -> Result<(StatusCode, HeaderMap, Json<FoodItem>), (StatusCode, String)> {
    let item = FoodItem::from_estimate(body.estimate, body.image_url);
    state.diary.write().await.log_item(item.clone());
    info!(id = %item.id, name = %item.name, calories = item.calories, "food logged");

    let mut headers = HeaderMap::new();
    let location: axum::http::HeaderValue = format!("/api/v1/diary/items/{}", item.id)
        .parse()
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "bad location header".to_string()))?;
    headers.insert(axum::http::header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(item)))
}

#[instrument(skip(state))]
pub async fn list_items(State(state): State<AppState>) -> Json<Vec<FoodItem>> {
    let items = state.diary.read().await.items();
    Json(items)
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodItem>, (StatusCode, String)> {
    let item = state.diary.read().await.item(id).cloned();
    item.map(Json).ok_or((StatusCode::NOT_FOUND, "Food item not found".into()))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = state.diary.write().await.remove_item(id);
    match removed {
        Some(item) => {
            info!(%id, name = %item.name, "food removed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => {
            warn!(%id, "delete of unknown food item");
            Err((StatusCode::NOT_FOUND, "Food item not found".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn today_stats(State(state): State<AppState>) -> Json<Dashboard> {
    let diary = state.diary.read().await;
    Json(Dashboard::new(diary.stats_for(today()), diary.profile()))
}

/// GET /diary/week: calories per day for the last seven days, today last.
#[instrument(skip(state))]
pub async fn week_trend(State(state): State<AppState>) -> Json<Vec<DayCalories>> {
    let week = state.diary.read().await.week_ending(today());
    Json(week)
}

#[instrument(skip(state))]
pub async fn add_water(State(state): State<AppState>) -> Json<WaterResponse> {
    let date = today();
    let water = state.diary.write().await.add_water(date);
    Json(WaterResponse { date, water })
}

#[instrument(skip(state))]
pub async fn remove_water(State(state): State<AppState>) -> Json<WaterResponse> {
    let date = today();
    let water = state.diary.write().await.remove_water(date);
    Json(WaterResponse { date, water })
}

#[instrument(skip(state))]
pub async fn get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    let profile = state.diary.read().await.profile().clone();
    Json(profile)
}

#[instrument(skip(state, update))]
pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Json<UserProfile> {
    let mut diary = state.diary.write().await;
    let profile = diary.update_profile(update).clone();
    info!(name = %profile.name, daily_goal = profile.daily_goal, "profile updated");
    Json(profile)
}
