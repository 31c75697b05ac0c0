use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use medagent_core::advisory::FallbackAdvice;
use medagent_core::intake::AgeBounds;
use medagent_core::risk::RiskRules;
use medagent_core::symptoms::SymptomDefinition;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/catalog", get(get_catalog))
}

/// Response for GET /v1/catalog
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CatalogResponse {
    /// Checklist entries in display order
    pub symptoms: Vec<SymptomDefinition>,
    pub age_bounds: AgeBounds,
    pub rules: RiskRules,
    /// Texts served per category when advice cannot be generated
    pub fallback: FallbackAdvice,
}

/// Get the intake form definition
///
/// Returns the symptom checklist, accepted age range and the classification
/// rules the relay applies, plus its fallback texts so clients that cannot
/// reach the advisory route show the same words. Static for the lifetime of the process.
#[utoipa::path(
    get,
    path = "/v1/catalog",
    responses(
        (status = 200, description = "Intake form definition", body = CatalogResponse)
    ),
    tag = "intake"
)]
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        symptoms: state.intake.catalog.iter().cloned().collect(),
        age_bounds: state.intake.age_bounds,
        rules: (*state.rules).clone(),
        fallback: state.advisory.fallback().clone(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use medagent_core::advisory::FallbackAdvice;

    use crate::routes::testing::{body_json, state_with};

    #[tokio::test]
    async fn catalog_lists_symptoms_and_bounds() {
        let app = super::router().with_state(state_with(&[
            ("MEDAGENT_MIN_AGE", "1"),
            ("MEDAGENT_MAX_AGE", "120"),
        ]));
        let response = app
            .oneshot(Request::builder().uri("/v1/catalog").body(Body::empty()).expect("request"))
            .await
            .expect("request should succeed");

        let body = body_json(response).await;
        assert_eq!(body["symptoms"].as_array().map(Vec::len), Some(8));
        assert_eq!(body["symptoms"][0]["name"], "fever");
        assert_eq!(body["age_bounds"]["min"], 1);
        assert_eq!(body["age_bounds"]["max"], 120);
        assert_eq!(body["rules"]["critical_symptom"], "shortness_breath");
    }

    #[tokio::test]
    async fn respiratory_catalog_switches_critical_symptom() {
        let app = super::router().with_state(state_with(&[("MEDAGENT_CATALOG", "respiratory")]));
        let response = app
            .oneshot(Request::builder().uri("/v1/catalog").body(Body::empty()).expect("request"))
            .await
            .expect("request should succeed");

        let body = body_json(response).await;
        assert_eq!(body["rules"]["critical_symptom"], "difficulty_breathing");
    }

    #[tokio::test]
    async fn catalog_carries_configured_fallback_texts() {
        let app = super::router()
            .with_state(state_with(&[("MEDAGENT_FALLBACK_HIGH", "Call 112 now.")]));
        let response = app
            .oneshot(Request::builder().uri("/v1/catalog").body(Body::empty()).expect("request"))
            .await
            .expect("request should succeed");

        let body = body_json(response).await;
        assert_eq!(body["fallback"]["high"], "Call 112 now.");
        assert_eq!(body["fallback"]["low"], FallbackAdvice::default().low);
    }
}
