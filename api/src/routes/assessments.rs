use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use medagent_core::error::ApiError;
use medagent_core::intake::{IntakeForm, PatientRecord, validate};
use medagent_core::risk::{RiskCategory, Severity};
use serde::Serialize;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/assessments", post(create_assessment))
}

/// Response for POST /v1/assessments
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AssessmentResponse {
    pub patient: PatientRecord,
    pub risk: RiskCategory,
    pub severity: Severity,
    /// Next-step message for the category
    pub guidance: String,
    pub assessed_at: DateTime<Utc>,
}

/// Validate an intake form and classify it.
pub(crate) fn assess(
    state: &AppState,
    form: &IntakeForm,
) -> Result<(PatientRecord, RiskCategory), AppError> {
    let record = validate(form, &state.intake)?;
    let risk = state.rules.classify(&record);
    tracing::info!(
        risk = %risk,
        selected = record.selected_count(),
        "Assessment classified"
    );
    Ok((record, risk))
}

/// Submit an intake form
///
/// Validates name, age and symptom selection, then classifies risk. Nothing
/// is stored; the same form always yields the same category.
#[utoipa::path(
    post,
    path = "/v1/assessments",
    request_body = IntakeForm,
    responses(
        (status = 200, description = "Validated record and risk category", body = AssessmentResponse),
        (status = 400, description = "Intake validation failed", body = ApiError)
    ),
    tag = "intake"
)]
pub async fn create_assessment(
    State(state): State<AppState>,
    AppJson(form): AppJson<IntakeForm>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let (patient, risk) = assess(&state, &form)?;

    Ok(Json(AssessmentResponse {
        patient,
        risk,
        severity: risk.severity(),
        guidance: risk.guidance().to_string(),
        assessed_at: Utc::now(),
    }))
}
