use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::intake::ValidationError;

/// Structured error body returned by the relay.
/// Carries enough detail for the intake form to highlight the offending field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "not_found")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

impl ApiError {
    pub fn validation(err: &ValidationError, request_id: impl Into<String>) -> Self {
        let received = match err {
            ValidationError::AgeOutOfRange { age, .. } => Some(serde_json::json!(age)),
            ValidationError::UnknownSymptom(name) => Some(serde_json::json!(name)),
            _ => None,
        };
        let docs_hint = match err {
            ValidationError::UnknownSymptom(_) => {
                Some("GET /v1/catalog lists the accepted symptom identifiers.".to_string())
            }
            _ => None,
        };

        Self {
            error: codes::VALIDATION_FAILED.to_string(),
            message: err.to_string(),
            field: Some(err.field().to_string()),
            received,
            request_id: request_id.into(),
            docs_hint,
        }
    }
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const RATE_LIMITED: &str = "rate_limited";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_field_and_received_value() {
        let err = ValidationError::AgeOutOfRange {
            age: 130,
            min: 5,
            max: 99,
        };
        let body = ApiError::validation(&err, "req-1");

        assert_eq!(body.error, codes::VALIDATION_FAILED);
        assert_eq!(body.field.as_deref(), Some("age"));
        assert_eq!(body.received, Some(serde_json::json!(130)));
        assert_eq!(body.request_id, "req-1");
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let body = ApiError::validation(&ValidationError::MissingName, "req-2");
        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("received").is_none());
        assert!(json.get("docs_hint").is_none());
        assert_eq!(json["message"], "Please enter your name");
    }
}
