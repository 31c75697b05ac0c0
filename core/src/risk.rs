use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::intake::PatientRecord;
use crate::symptoms::{SHORTNESS_OF_BREATH, Symptom};

pub const DEFAULT_HIGH_COUNT: usize = 4;
pub const DEFAULT_MODERATE_COUNT: usize = 2;

/// Coarse risk derived from the symptom checklist, ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

/// Presentation tone for a risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Caution,
    Alert,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Moderate => "MODERATE",
            RiskCategory::High => "HIGH",
        }
    }

    /// Next-step message shown alongside the category.
    pub fn guidance(self) -> &'static str {
        match self {
            RiskCategory::Low => {
                "Monitor your condition and rest. Contact a healthcare provider if symptoms worsen."
            }
            RiskCategory::Moderate => {
                "Consider contacting a doctor for further evaluation of your symptoms."
            }
            RiskCategory::High => {
                "Seek immediate medical attention. Contact emergency services if necessary."
            }
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            RiskCategory::Low => Severity::Ok,
            RiskCategory::Moderate => Severity::Caution,
            RiskCategory::High => Severity::Alert,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold rules for classification. Rules are evaluated in order and the
/// first match wins; a selected critical symptom dominates any count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RiskRules {
    /// Identifier of the respiratory-distress symptom
    pub critical_symptom: String,
    /// Selected count at or above which the category is High
    pub high_count: usize,
    /// Selected count at or above which the category is Moderate
    pub moderate_count: usize,
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            critical_symptom: SHORTNESS_OF_BREATH.to_string(),
            high_count: DEFAULT_HIGH_COUNT,
            moderate_count: DEFAULT_MODERATE_COUNT,
        }
    }
}

impl RiskRules {
    pub fn with_critical_symptom(critical_symptom: impl Into<String>) -> Self {
        Self {
            critical_symptom: critical_symptom.into(),
            ..Self::default()
        }
    }

    pub fn classify(&self, record: &PatientRecord) -> RiskCategory {
        self.classify_symptoms(record.symptoms())
    }

    /// Classify a raw checklist. Total: an empty selection is `Low`.
    pub fn classify_symptoms(&self, symptoms: &[Symptom]) -> RiskCategory {
        let mut count = 0;
        let mut critical = false;
        for symptom in symptoms.iter().filter(|s| s.selected) {
            count += 1;
            critical |= symptom.name == self.critical_symptom;
        }

        if critical || count >= self.high_count {
            RiskCategory::High
        } else if count >= self.moderate_count {
            RiskCategory::Moderate
        } else {
            RiskCategory::Low
        }
    }
}

/// Classify with the default rules.
pub fn classify(record: &PatientRecord) -> RiskCategory {
    RiskRules::default().classify(record)
}
