use axum::extract::State;
use axum::{Json, Router, routing::get};

use crate::HealthResponse;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Health check endpoint
///
/// Reports whether the generation endpoint is configured. An unconfigured
/// relay still answers every advisory request, with fallback text only.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let generation_configured = state.advisory.is_configured();

    Json(HealthResponse {
        status: if generation_configured { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        generation_configured,
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::routes::testing::{body_json, state_with};

    #[tokio::test]
    async fn health_reports_degraded_without_generation_key() {
        let app = super::router().with_state(state_with(&[]));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["generation_configured"], false);
    }

    #[tokio::test]
    async fn health_reports_ok_with_generation_key() {
        let app = super::router().with_state(state_with(&[("MEDAGENT_GENERATION_API_KEY", "k")]));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("request should succeed");

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }
}
