use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::intake::PatientRecord;
use crate::risk::RiskCategory;

pub const DEFAULT_MAX_WORDS: u16 = 80;

pub const SERVICE_UNAVAILABLE_NOTICE: &str = "Unable to fetch AI consultation at this time.";

const FALLBACK_LOW: &str = "Based on your symptoms, focus on rest, hydration, and monitoring your condition. \
Over-the-counter medications may help with comfort. Contact a healthcare provider if symptoms persist or worsen.";

const FALLBACK_MODERATE: &str = "Your symptoms suggest you should consider medical evaluation. \
Monitor your condition closely, stay hydrated, and don't hesitate to contact a healthcare provider for guidance.";

const FALLBACK_HIGH: &str = "Given your symptoms, it's important to seek medical attention promptly. \
If you experience worsening symptoms, difficulty breathing, or severe pain, contact emergency services immediately.";

/// Why a generation call produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    #[error("generation endpoint is not configured")]
    NotConfigured,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("generation request timed out")]
    Timeout,
    #[error("generation endpoint answered with status {0}")]
    Status(u16),
    #[error("malformed generation response: {0}")]
    Malformed(String),
}

impl RetrievalError {
    /// Short machine label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RetrievalError::NotConfigured => "not_configured",
            RetrievalError::Transport(_) => "transport",
            RetrievalError::Timeout => "timeout",
            RetrievalError::Status(_) => "status",
            RetrievalError::Malformed(_) => "malformed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryOrigin {
    Generated,
    Fallback,
}

/// Advisory text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdvisoryResult {
    pub text: String,
    pub origin: AdvisoryOrigin,
    /// User-visible "service unavailable" notice, set on fallback results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl AdvisoryResult {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: AdvisoryOrigin::Generated,
            notice: None,
        }
    }

    pub fn fallback(risk: RiskCategory, messages: &FallbackAdvice) -> Self {
        Self {
            text: messages.for_risk(risk).to_string(),
            origin: AdvisoryOrigin::Fallback,
            notice: Some(SERVICE_UNAVAILABLE_NOTICE.to_string()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == AdvisoryOrigin::Fallback
    }
}

/// Caller-observed lifecycle of one advisory request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdvisoryState {
    #[default]
    Idle,
    Pending,
    Resolved(AdvisoryResult),
}

/// Pre-written advice used when generation fails, one per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FallbackAdvice {
    pub low: String,
    pub moderate: String,
    pub high: String,
}

impl Default for FallbackAdvice {
    fn default() -> Self {
        Self {
            low: FALLBACK_LOW.to_string(),
            moderate: FALLBACK_MODERATE.to_string(),
            high: FALLBACK_HIGH.to_string(),
        }
    }
}

impl FallbackAdvice {
    pub fn for_risk(&self, risk: RiskCategory) -> &str {
        match risk {
            RiskCategory::Low => &self.low,
            RiskCategory::Moderate => &self.moderate,
            RiskCategory::High => &self.high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Addresses the patient by name
    #[default]
    Named,
    /// Leaves the name out of the prompt
    Anonymous,
}

impl std::str::FromStr for PromptStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "named" => Ok(PromptStyle::Named),
            "anonymous" => Ok(PromptStyle::Anonymous),
            other => Err(format!("unknown prompt style '{other}' (expected named|anonymous)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub style: PromptStyle,
    pub max_words: u16,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            style: PromptStyle::Named,
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

impl PromptTemplate {
    pub fn anonymous() -> Self {
        Self {
            style: PromptStyle::Anonymous,
            ..Self::default()
        }
    }

    pub fn render(&self, record: &PatientRecord) -> String {
        let symptoms = record.selected_labels().join(", ");
        let subject = match self.style {
            PromptStyle::Named => format!(
                "A user named {}, aged {}, reports the following symptoms: {symptoms}.",
                record.name(),
                record.age()
            ),
            PromptStyle::Anonymous => format!(
                "A user aged {} reports the following symptoms: {symptoms}.",
                record.age()
            ),
        };

        format!(
            "{subject} Provide medically neutral but empathetic guidance suitable for a \
             non-medical audience in under {} words. Do not give a diagnosis, include general \
             wellness recommendations, and remind them to consult a healthcare professional \
             for serious concerns.",
            self.max_words
        )
    }
}

// ── Generation wire schema ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Result<&str, RetrievalError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| RetrievalError::Malformed("no candidates".to_string()))?;
        let content = candidate
            .content
            .as_ref()
            .ok_or_else(|| RetrievalError::Malformed("candidate has no content".to_string()))?;
        let part = content
            .parts
            .first()
            .ok_or_else(|| RetrievalError::Malformed("content has no parts".to_string()))?;

        if part.text.trim().is_empty() {
            return Err(RetrievalError::Malformed("generated text is empty".to_string()));
        }
        Ok(&part.text)
    }
}
