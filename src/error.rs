use axum::http::StatusCode;
use thiserror::Error;

/// Failure talking to the hosted model itself, before any payload parsing.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed model envelope: {0}")]
    Envelope(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file is not a readable image: {0}")]
    Unreadable(#[source] image::ImageError),
    #[error("image has no drawable surface ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
    #[error("failed to re-encode image: {0}")]
    Encode(#[source] image::ImageError),
}

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("no response from model")]
    EmptyResponse,
    #[error("model returned invalid food JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PlanGenerationError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("no response from model")]
    EmptyResponse,
    #[error("model returned invalid meal plan JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

impl From<DecodeError> for (StatusCode, String) {
    fn from(e: DecodeError) -> Self {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    }
}

impl From<RecognitionError> for (StatusCode, String) {
    fn from(e: RecognitionError) -> Self {
        (StatusCode::BAD_GATEWAY, e.to_string())
    }
}

impl From<PlanGenerationError> for (StatusCode, String) {
    fn from(e: PlanGenerationError) -> Self {
        (StatusCode::BAD_GATEWAY, e.to_string())
    }
}
