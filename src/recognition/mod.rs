pub mod dto;
pub mod handlers;
pub mod mapper;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    handlers::scan_routes(max_upload_bytes)
}
