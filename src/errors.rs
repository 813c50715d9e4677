use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

/// Domain errors raised by the review subsystem
///
/// The repository layer returns `anyhow::Result` and wraps these, so callers
/// can recover the typed error with `downcast_ref`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Review item not found")]
    NotFound,
    #[error("Invalid rating: {0}")]
    InvalidRating(String),
    #[error("Invalid queue filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid source type: {0}")]
    InvalidSourceType(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Review session is already complete")]
    SessionComplete,
    #[error("An active review item already exists for this source")]
    DuplicateActive,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Review store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
    #[error("Review item/session not found")]
    NotFound,
    #[error("Invalid rating: {0}")]
    InvalidRating(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound => ApiError::NotFound,
            ReviewError::InvalidRating(msg) => ApiError::InvalidRating(msg),
            ReviewError::InvalidFilter(_)
            | ReviewError::InvalidSourceType(_)
            | ReviewError::InvalidStatus(_) => ApiError::InvalidInput(err.to_string()),
            ReviewError::SessionComplete | ReviewError::DuplicateActive => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ReviewError>() {
            Ok(review_err) => review_err.into(),
            Err(err) => ApiError::StoreUnavailable(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::StoreUnavailable(err) => {
                error!("Review store error: {:#}", err);
                (StatusCode::SERVICE_UNAVAILABLE, "Review store unavailable".to_string())
            },
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Review item/session not found".to_string()),
            ApiError::InvalidRating(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
