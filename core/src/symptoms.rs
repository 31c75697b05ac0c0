use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::intake::ValidationError;

/// Identifier of the respiratory-distress entry in the default catalog.
pub const SHORTNESS_OF_BREATH: &str = "shortness_breath";

/// Identifier of the respiratory-distress entry in the alternative catalog.
pub const DIFFICULTY_BREATHING: &str = "difficulty_breathing";

const DEFAULT_CATALOG: &[(&str, &str)] = &[
    ("fever", "Fever"),
    ("headache", "Headache"),
    ("cough", "Cough"),
    ("fatigue", "Fatigue"),
    ("chest_pain", "Chest Pain"),
    (SHORTNESS_OF_BREATH, "Shortness of Breath"),
    ("nausea", "Nausea"),
    ("sore_throat", "Sore Throat"),
];

const RESPIRATORY_VARIANT_CATALOG: &[(&str, &str)] = &[
    ("fever", "Fever"),
    ("headache", "Headache"),
    ("fatigue", "Fatigue"),
    ("cough", "Cough"),
    ("chest_pain", "Chest Pain"),
    ("nausea", "Nausea"),
    ("sore_throat", "Sore Throat"),
    (DIFFICULTY_BREATHING, "Difficulty Breathing"),
];

/// One catalog entry, without selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SymptomDefinition {
    /// Stable identifier (e.g. "fever", "shortness_breath")
    pub name: String,
    /// Human-readable label shown on the intake form
    pub label: String,
}

impl SymptomDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// A catalog entry together with whether the patient ticked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Symptom {
    pub name: String,
    pub label: String,
    pub selected: bool,
}

/// The fixed, ordered symptom checklist offered at intake.
///
/// Identifiers are unique. The catalog is built once at startup and never
/// grows or shrinks at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SymptomCatalog {
    entries: Vec<SymptomDefinition>,
}

impl Default for SymptomCatalog {
    fn default() -> Self {
        Self::from_static(DEFAULT_CATALOG)
    }
}

impl SymptomCatalog {
    /// Build a catalog, rejecting empty or duplicate identifiers.
    pub fn new(entries: Vec<SymptomDefinition>) -> Result<Self, ValidationError> {
        if entries.is_empty() {
            return Err(ValidationError::InvalidCatalog(
                "catalog must contain at least one symptom".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(ValidationError::InvalidCatalog(
                    "symptom identifiers must not be empty".to_string(),
                ));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ValidationError::InvalidCatalog(format!(
                    "duplicate symptom identifier '{}'",
                    entry.name
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Catalog wording that uses "Difficulty Breathing" as its critical entry.
    pub fn respiratory_variant() -> Self {
        Self::from_static(RESPIRATORY_VARIANT_CATALOG)
    }

    fn from_static(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, label)| SymptomDefinition::new(*name, *label))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymptomDefinition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SymptomDefinition> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Expand a list of selected identifiers into the full, ordered checklist.
    ///
    /// Order follows the catalog, not the input. Repeated identifiers select
    /// once; unknown identifiers are rejected.
    pub fn select<S: AsRef<str>>(&self, selected: &[S]) -> Result<Vec<Symptom>, ValidationError> {
        let mut wanted = HashSet::new();
        for name in selected {
            let name = name.as_ref().trim();
            if !self.contains(name) {
                return Err(ValidationError::UnknownSymptom(name.to_string()));
            }
            wanted.insert(name);
        }

        Ok(self
            .entries
            .iter()
            .map(|entry| Symptom {
                name: entry.name.clone(),
                label: entry.label.clone(),
                selected: wanted.contains(entry.name.as_str()),
            })
            .collect())
    }
}
