use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use medagent_core::error::{self, ApiError};
use medagent_core::intake::ValidationError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Intake validation failed (400)
    Intake(ValidationError),
    /// Malformed request body (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Unknown route (404)
    NotFound { resource: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Intake(err) => {
                tracing::debug!(field = err.field(), "Intake rejected: {err}");
                (StatusCode::BAD_REQUEST, ApiError::validation(&err, request_id))
            }
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                ApiError {
                    error: error::codes::NOT_FOUND.to_string(),
                    message: format!("{resource} not found"),
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: Some("See /swagger-ui for the available routes.".to_string()),
                },
            ),
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Intake(err)
    }
}

/// Fallback handler for unmatched routes.
pub async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound {
        resource: uri.path().to_string(),
    }
}
