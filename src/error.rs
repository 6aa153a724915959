//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// A request parameter failed validation. The message names the
    /// offending parameter and is safe to echo back to the caller.
    #[error("{0}")]
    Validation(String),

    /// The backing store failed or rejected a query.
    #[error("store unavailable")]
    Store(#[from] anyhow::Error),

    /// The store deadline elapsed before the request pipeline finished.
    #[error("store deadline exceeded")]
    Deadline,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Deadline => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Validation messages go back to the caller; store details are
        // logged here and replaced with a vague body.
        let error = match &self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Store(e) => {
                tracing::error!(error = %e, "store error");
                "store unavailable".to_string()
            }
            AppError::Deadline => {
                tracing::warn!("store deadline exceeded");
                "store unavailable".to_string()
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
