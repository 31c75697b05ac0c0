use medagent_core::advisory::{AdvisoryResult, FallbackAdvice};
use medagent_core::intake::{AgeBounds, IntakeConfig, IntakeForm, PatientRecord};
use medagent_core::risk::{RiskCategory, RiskRules};
use medagent_core::symptoms::{SymptomCatalog, SymptomDefinition};
use serde::Deserialize;
use serde_json::json;

use crate::session::Advisor;
use crate::util::raw_api_request;

#[derive(Debug, Deserialize)]
struct CatalogBody {
    symptoms: Vec<SymptomDefinition>,
    age_bounds: AgeBounds,
    rules: RiskRules,
    #[serde(default)]
    fallback: FallbackAdvice,
}

#[derive(Debug, Deserialize)]
struct AdvisoryBody {
    advisory: AdvisoryResult,
}

/// Intake form definition, classification rules and fallback texts served by
/// the relay.
#[derive(Debug, Clone, Default)]
pub struct IntakeProfile {
    pub intake: IntakeConfig,
    pub rules: RiskRules,
    pub fallback: FallbackAdvice,
}

impl IntakeProfile {
    pub async fn fetch(api_url: &str) -> Result<Self, String> {
        let (status, body) =
            raw_api_request(api_url, reqwest::Method::GET, "/v1/catalog", None).await?;
        if !(200..300).contains(&status) {
            return Err(format!("relay answered {status} for /v1/catalog"));
        }
        let body: CatalogBody =
            serde_json::from_value(body).map_err(|e| format!("unexpected catalog shape: {e}"))?;

        let catalog = SymptomCatalog::new(body.symptoms).map_err(|e| e.to_string())?;
        let age_bounds =
            AgeBounds::new(body.age_bounds.min, body.age_bounds.max).map_err(|e| e.to_string())?;

        Ok(Self {
            intake: IntakeConfig {
                age_bounds,
                catalog,
            },
            rules: body.rules,
            fallback: body.fallback,
        })
    }

    /// Like `fetch`, but an unreachable or misbehaving relay yields the
    /// built-in defaults so local validation can still run.
    pub async fn fetch_or_default(api_url: &str) -> Self {
        match Self::fetch(api_url).await {
            Ok(profile) => profile,
            Err(error) => {
                tracing::warn!(%error, "Could not load intake catalog from relay, using defaults");
                Self::default()
            }
        }
    }
}

/// Why the relay produced no advisory.
#[derive(Debug)]
enum RelayFailure {
    /// The relay's intake rules refused a record the CLI accepted.
    Rejected {
        field: Option<String>,
        message: String,
    },
    Unavailable(String),
}

/// Advisor backed by the relay's POST /v1/advisory.
///
/// Never fails: any transport, status or shape problem resolves to the
/// fallback text for the risk category, using the relay's configured texts
/// when the profile carried them.
#[derive(Debug, Clone)]
pub struct RelayAdvisor {
    api_url: String,
    anonymous: bool,
    fallback: FallbackAdvice,
}

impl RelayAdvisor {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            anonymous: false,
            fallback: FallbackAdvice::default(),
        }
    }

    pub fn for_profile(api_url: impl Into<String>, profile: &IntakeProfile) -> Self {
        Self::new(api_url).with_fallback(profile.fallback.clone())
    }

    pub fn with_fallback(mut self, fallback: FallbackAdvice) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    async fn fetch(&self, record: &PatientRecord) -> Result<AdvisoryResult, RelayFailure> {
        let request = json!({
            "intake": IntakeForm::from(record),
            "anonymous": self.anonymous,
        });
        let (status, body) = raw_api_request(
            &self.api_url,
            reqwest::Method::POST,
            "/v1/advisory",
            Some(&request),
        )
        .await
        .map_err(RelayFailure::Unavailable)?;

        if status == 400 {
            return Err(RelayFailure::Rejected {
                field: body["field"].as_str().map(str::to_string),
                message: body["message"]
                    .as_str()
                    .unwrap_or("intake rejected")
                    .to_string(),
            });
        }
        if !(200..300).contains(&status) {
            return Err(RelayFailure::Unavailable(format!("relay answered {status}")));
        }
        serde_json::from_value::<AdvisoryBody>(body)
            .map(|b| b.advisory)
            .map_err(|e| RelayFailure::Unavailable(format!("unexpected advisory shape: {e}")))
    }
}

impl Advisor for RelayAdvisor {
    async fn advise(&self, record: &PatientRecord, risk: RiskCategory) -> AdvisoryResult {
        match self.fetch(record).await {
            Ok(advisory) => advisory,
            Err(RelayFailure::Rejected { field, message }) => {
                tracing::error!(
                    risk = %risk,
                    field = field.as_deref().unwrap_or("body"),
                    %message,
                    "Relay rejected an intake that passed local validation"
                );
                AdvisoryResult {
                    notice: Some(format!("The relay rejected this intake: {message}")),
                    ..AdvisoryResult::fallback(risk, &self.fallback)
                }
            }
            Err(RelayFailure::Unavailable(error)) => {
                tracing::warn!(
                    risk = %risk,
                    %error,
                    "Advisory relay unavailable, using local fallback"
                );
                AdvisoryResult::fallback(risk, &self.fallback)
            }
        }
    }
}
