use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use medagent_core::advisory::{AdvisoryResult, PromptStyle, PromptTemplate};
use medagent_core::error::ApiError;
use medagent_core::intake::IntakeForm;
use medagent_core::risk::RiskCategory;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extract::AppJson;
use crate::routes::assessments::assess;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/advisory", post(request_advisory))
}

/// Request for POST /v1/advisory
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AdvisoryRequest {
    pub intake: IntakeForm,
    /// Leave the patient name out of the generation prompt
    #[serde(default)]
    pub anonymous: bool,
}

/// Response for POST /v1/advisory
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdvisoryResponse {
    /// Category recomputed by the relay from the submitted intake
    pub risk: RiskCategory,
    pub advisory: AdvisoryResult,
    pub resolved_at: DateTime<Utc>,
}

/// Get advisory guidance for an intake
///
/// The relay re-validates and re-classifies the intake, then asks the
/// generation service for advice. Generation problems never surface as
/// errors: the response carries the category's fallback text with
/// `origin = "fallback"` instead. Call again to refresh.
#[utoipa::path(
    post,
    path = "/v1/advisory",
    request_body = AdvisoryRequest,
    responses(
        (status = 200, description = "Generated or fallback advisory", body = AdvisoryResponse),
        (status = 400, description = "Intake validation failed", body = ApiError),
        (status = 429, description = "Too many advisory requests", body = ApiError)
    ),
    tag = "advisory"
)]
pub async fn request_advisory(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdvisoryRequest>,
) -> Result<Json<AdvisoryResponse>, AppError> {
    let (record, risk) = assess(&state, &req.intake)?;

    let advisory = if req.anonymous {
        let prompt = PromptTemplate {
            style: PromptStyle::Anonymous,
            ..state.advisory.prompt()
        };
        state.advisory.get_advisory_with(&record, risk, prompt).await
    } else {
        state.advisory.get_advisory(&record, risk).await
    };

    Ok(Json(AdvisoryResponse {
        risk,
        advisory,
        resolved_at: Utc::now(),
    }))
}
