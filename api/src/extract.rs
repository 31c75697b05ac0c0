//! `AppJson<T>` replaces `axum::Json<T>` in handler signatures so that body
//! problems come back as a structured 400 instead of axum's plain-text 4xx.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::AppError;

const SCHEMA_HINT: &str = "Compare the body with the schema at /api-doc/openapi.json.";

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| AppJson(value))
            .map_err(map_json_rejection)
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let detail = rejection.body_text();
    let (field, message) = match &rejection {
        JsonRejection::MissingJsonContentType(_) => (
            "content-type".to_string(),
            "Expected 'Content-Type: application/json'".to_string(),
        ),
        JsonRejection::JsonSyntaxError(_) => {
            ("body".to_string(), format!("Request body is not valid JSON: {detail}"))
        }
        _ => (
            field_from_serde_message(&detail).unwrap_or_else(|| "body".to_string()),
            format!("Invalid request body: {detail}"),
        ),
    };

    AppError::Validation {
        message,
        field: Some(field),
        received: None,
        docs_hint: Some(SCHEMA_HINT.to_string()),
    }
}

/// Field named in serde's "missing field `x`" / "unknown field `x`" messages.
fn field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `"].iter().find_map(|marker| {
        let rest = &msg[msg.find(marker)? + marker.len()..];
        rest.find('`').map(|end| rest[..end].to_string())
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    #[allow(dead_code)]
    struct AdvisoryBody {
        intake: String,
    }

    async fn reject(content_type: Option<&str>, body: &str) -> serde_json::Value {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let req = builder.body(Body::from(body.to_string())).expect("request");
        let err = match AppJson::<AdvisoryBody>::from_request(req, &()).await {
            Ok(_) => panic!("body should be rejected"),
            Err(err) => err,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json error body")
    }

    #[tokio::test]
    async fn missing_field_is_named() {
        let body = reject(Some("application/json"), "{}").await;
        assert_eq!(body["field"], "intake");
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn unknown_field_is_named() {
        let body = reject(Some("application/json"), r#"{"intake":"x","risk":"LOW"}"#).await;
        assert_eq!(body["field"], "risk");
    }

    #[tokio::test]
    async fn syntax_and_content_type_problems_are_distinguished() {
        assert_eq!(reject(Some("application/json"), "{").await["field"], "body");
        assert_eq!(reject(None, r#"{"intake":"x"}"#).await["field"], "content-type");
    }

    #[test]
    fn generic_serde_messages_have_no_field() {
        assert_eq!(field_from_serde_message("invalid type: string, expected i64"), None);
    }
}
