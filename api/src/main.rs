use std::net::SocketAddr;

use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod advisory;
mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedAgent Relay API",
        version = "0.1.0",
        description = "Symptom intake, risk classification and advisory guidance. \
                       Guidance is informational and does not replace professional medical advice."
    ),
    paths(
        routes::health::health_check,
        routes::catalog::get_catalog,
        routes::assessments::create_assessment,
        routes::advisory::request_advisory,
    ),
    components(schemas(
        HealthResponse,
        medagent_core::error::ApiError,
        medagent_core::intake::IntakeForm,
        medagent_core::intake::PatientRecord,
        medagent_core::intake::AgeBounds,
        medagent_core::symptoms::Symptom,
        medagent_core::symptoms::SymptomDefinition,
        medagent_core::risk::RiskCategory,
        medagent_core::risk::RiskRules,
        medagent_core::risk::Severity,
        medagent_core::advisory::AdvisoryResult,
        medagent_core::advisory::AdvisoryOrigin,
        medagent_core::advisory::FallbackAdvice,
        routes::catalog::CatalogResponse,
        routes::assessments::AssessmentResponse,
        routes::advisory::AdvisoryRequest,
        routes::advisory::AdvisoryResponse,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether a generation API key is configured
    pub generation_configured: bool,
}

fn app(state: state::AppState, require_https: bool) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::catalog::router().layer(middleware::rate_limit::intake_layer()))
        .merge(routes::assessments::router().layer(middleware::rate_limit::intake_layer()))
        .merge(routes::advisory::router().layer(middleware::rate_limit::advisory_layer()))
        .fallback(error::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .option_layer(require_https.then(|| {
                    axum::middleware::from_fn(middleware::https::require_https)
                }))
                .layer(middleware::cors::build_cors_layer())
                .layer(axum::middleware::from_fn(middleware::security_headers::apply)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medagent_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let relay_config = match config::RelayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!(config = ?relay_config, "Configuration loaded");

    if relay_config.generation_api_key.is_none() {
        tracing::warn!(
            "MEDAGENT_GENERATION_API_KEY is not set; every advisory will use fallback text"
        );
    }

    let app_state = state::AppState::from_config(&relay_config);
    let router = app(app_state, relay_config.require_https);

    let addr = SocketAddr::from(([0, 0, 0, 0], relay_config.port));
    tracing::info!("MedAgent relay listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!("Server error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use utoipa::OpenApi;

    use super::ApiDoc;
    use crate::routes::testing::{body_json, state_with};

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/v1/catalog", "/v1/assessments", "/v1/advisory"] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI");
        }
    }

    #[tokio::test]
    async fn unknown_route_is_structured_404() {
        let app = super::app(state_with(&[]), false);
        let response = app
            .oneshot(Request::builder().uri("/v1/nope").body(Body::empty()).expect("request"))
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("x-content-type-options").expect("security headers"),
            "nosniff"
        );
        let body = body_json(response).await;
        assert_eq!(body["error"], "not_found");
    }
}
