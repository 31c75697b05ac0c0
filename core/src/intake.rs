use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::symptoms::{Symptom, SymptomCatalog};

pub const DEFAULT_MIN_AGE: u8 = 5;
pub const DEFAULT_MAX_AGE: u8 = 99;

/// Input problems found while turning a raw intake form into a `PatientRecord`.
///
/// Every variant is recoverable by correcting the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,
    #[error("Please enter your age")]
    MissingAge,
    #[error("Please enter a valid age between {min} and {max}")]
    AgeOutOfRange { age: i64, min: u8, max: u8 },
    #[error("Unknown symptom '{0}'")]
    UnknownSymptom(String),
    #[error("Please select at least one symptom to continue")]
    NoSymptomsSelected,
    #[error("Invalid intake configuration: {0}")]
    InvalidCatalog(String),
}

impl ValidationError {
    /// Name of the form field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingName => "name",
            ValidationError::MissingAge | ValidationError::AgeOutOfRange { .. } => "age",
            ValidationError::UnknownSymptom(_) | ValidationError::NoSymptomsSelected => {
                "symptoms"
            }
            ValidationError::InvalidCatalog(_) => "catalog",
        }
    }
}

/// Inclusive age range accepted at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgeBounds {
    pub min: u8,
    pub max: u8,
}

impl Default for AgeBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_AGE,
            max: DEFAULT_MAX_AGE,
        }
    }
}

impl AgeBounds {
    pub fn new(min: u8, max: u8) -> Result<Self, ValidationError> {
        if min > max {
            return Err(ValidationError::InvalidCatalog(format!(
                "age bounds are inverted ({min} > {max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, age: i64) -> bool {
        age >= i64::from(self.min) && age <= i64::from(self.max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntakeConfig {
    pub age_bounds: AgeBounds,
    pub catalog: SymptomCatalog,
}

/// Raw fields as entered on the intake form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IntakeForm {
    /// Patient name; surrounding whitespace is ignored
    #[serde(default)]
    pub name: String,
    /// Age in whole years
    #[serde(default)]
    pub age: Option<i64>,
    /// Identifiers of the ticked symptoms (e.g. ["fever", "cough"])
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl From<&PatientRecord> for IntakeForm {
    fn from(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            age: Some(i64::from(record.age)),
            symptoms: record.selected().map(|s| s.name.clone()).collect(),
        }
    }
}

/// A validated intake. Fields are private so the invariants hold for the
/// lifetime of the value: trimmed non-empty name, age within the configured
/// bounds, at least one selected symptom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PatientRecord {
    name: String,
    age: u8,
    symptoms: Vec<Symptom>,
}

impl PatientRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    /// The full checklist in catalog order, selected or not.
    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn selected(&self) -> impl Iterator<Item = &Symptom> {
        self.symptoms.iter().filter(|s| s.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn selected_labels(&self) -> Vec<&str> {
        self.selected().map(|s| s.label.as_str()).collect()
    }
}

/// Validate a raw form against the intake configuration.
///
/// Checks run in form order: name, age, symptoms.
pub fn validate(
    form: &IntakeForm,
    config: &IntakeConfig,
) -> Result<PatientRecord, ValidationError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }

    let age = form.age.ok_or(ValidationError::MissingAge)?;
    if !config.age_bounds.contains(age) {
        return Err(ValidationError::AgeOutOfRange {
            age,
            min: config.age_bounds.min,
            max: config.age_bounds.max,
        });
    }
    let age = u8::try_from(age).map_err(|_| ValidationError::AgeOutOfRange {
        age,
        min: config.age_bounds.min,
        max: config.age_bounds.max,
    })?;

    let symptoms = config.catalog.select(&form.symptoms)?;
    if !symptoms.iter().any(|s| s.selected) {
        return Err(ValidationError::NoSymptomsSelected);
    }

    Ok(PatientRecord {
        name: name.to_string(),
        age,
        symptoms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, age: Option<i64>, symptoms: &[&str]) -> IntakeForm {
        IntakeForm {
            name: name.to_string(),
            age,
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn validate_trims_name_and_keeps_full_checklist() {
        let record = validate(
            &form("  Alex ", Some(30), &["fever", "headache"]),
            &IntakeConfig::default(),
        )
        .expect("valid intake");

        assert_eq!(record.name(), "Alex");
        assert_eq!(record.age(), 30);
        assert_eq!(record.symptoms().len(), 8);
        assert_eq!(record.selected_labels(), vec!["Fever", "Headache"]);
        assert_eq!(record.selected_count(), 2);
    }

    #[test]
    fn validate_rejects_blank_name() {
        let err = validate(&form("   ", Some(30), &["fever"]), &IntakeConfig::default())
            .expect_err("blank name");
        assert_eq!(err, ValidationError::MissingName);
        assert_eq!(err.field(), "name");
    }

    #[test]
    fn validate_rejects_missing_age() {
        let err = validate(&form("Alex", None, &["fever"]), &IntakeConfig::default())
            .expect_err("missing age");
        assert_eq!(err, ValidationError::MissingAge);
    }

    #[test]
    fn validate_enforces_inclusive_age_bounds() {
        let config = IntakeConfig::default();
        assert!(validate(&form("Alex", Some(5), &["fever"]), &config).is_ok());
        assert!(validate(&form("Alex", Some(99), &["fever"]), &config).is_ok());

        let err = validate(&form("Alex", Some(4), &["fever"]), &config).expect_err("too young");
        assert_eq!(
            err,
            ValidationError::AgeOutOfRange {
                age: 4,
                min: 5,
                max: 99
            }
        );
        assert_eq!(err.to_string(), "Please enter a valid age between 5 and 99");
        assert!(validate(&form("Alex", Some(100), &["fever"]), &config).is_err());
        assert!(validate(&form("Alex", Some(-3), &["fever"]), &config).is_err());
    }

    #[test]
    fn validate_honours_configured_bounds() {
        let config = IntakeConfig {
            age_bounds: AgeBounds::new(1, 120).expect("valid bounds"),
            ..IntakeConfig::default()
        };
        let record = validate(&form("Sam", Some(120), &["cough"]), &config).expect("in range");
        assert_eq!(record.age(), 120);
    }

    #[test]
    fn validate_requires_a_selected_symptom() {
        let err = validate(&form("Alex", Some(30), &[]), &IntakeConfig::default())
            .expect_err("nothing selected");
        assert_eq!(err, ValidationError::NoSymptomsSelected);
        assert_eq!(err.field(), "symptoms");
    }

    #[test]
    fn validate_reports_name_before_age() {
        let err = validate(&form("", Some(500), &[]), &IntakeConfig::default())
            .expect_err("several problems");
        assert_eq!(err, ValidationError::MissingName);
    }

    #[test]
    fn record_converts_back_to_an_equivalent_form() {
        let config = IntakeConfig::default();
        let record =
            validate(&form("Alex", Some(30), &["nausea", "fever"]), &config).expect("valid");
        let again = validate(&IntakeForm::from(&record), &config).expect("still valid");
        assert_eq!(again, record);
    }

    #[test]
    fn age_bounds_reject_inverted_range() {
        assert!(AgeBounds::new(50, 10).is_err());
    }

    #[test]
    fn intake_form_deserializes_with_defaults() {
        let form: IntakeForm =
            serde_json::from_str(r#"{"name":"Alex"}"#).expect("partial form parses");
        assert_eq!(form.age, None);
        assert!(form.symptoms.is_empty());
    }
}
