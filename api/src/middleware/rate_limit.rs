use axum::http::{HeaderValue, Response, StatusCode};
use medagent_core::error::codes;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
};

type RateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, governor::middleware::NoOpMiddleware, axum::body::Body>;

/// Rate limit for POST /v1/advisory: 12 requests per minute per IP.
///
/// Every advisory call costs an upstream generation request, so refresh
/// spamming is capped here rather than at the generation provider.
pub fn advisory_layer() -> RateLimitLayer {
    GovernorLayer::new(
        GovernorConfigBuilder::default()
            .per_second(5) // 12 per minute = 1 per 5 seconds replenish
            .burst_size(6)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("invalid governor config for advisory"),
    )
    .error_handler(json_error_handler)
}

/// Rate limit for intake routes: 60 requests per minute per IP.
pub fn intake_layer() -> RateLimitLayer {
    GovernorLayer::new(
        GovernorConfigBuilder::default()
            .per_second(1)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("invalid governor config for intake"),
    )
    .error_handler(json_error_handler)
}

/// Render governor rejections in the `ApiError` shape, with Retry-After.
fn json_error_handler(err: GovernorError) -> Response<axum::body::Body> {
    let (status, code, retry_after, message) = match err {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            codes::RATE_LIMITED,
            Some(wait_time),
            format!("Too many requests. Retry after {wait_time} seconds."),
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL_ERROR,
            None,
            "Unable to determine client identity for rate limiting".to_string(),
        ),
        GovernorError::Other { code, msg, .. } => {
            let error = if code.is_server_error() {
                codes::INTERNAL_ERROR
            } else {
                codes::RATE_LIMITED
            };
            (code, error, None, msg.unwrap_or_default())
        }
    };

    let body = serde_json::json!({
        "error": code,
        "message": message,
        "request_id": uuid::Uuid::now_v7().to_string(),
    });

    let mut response = Response::new(axum::body::Body::from(body.to_string()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("content-type", HeaderValue::from_static("application/json"));
    if let Some(wait_time) = retry_after {
        response
            .headers_mut()
            .insert("retry-after", HeaderValue::from(wait_time));
    }

    response
}
