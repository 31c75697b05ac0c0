pub mod advise;
pub mod assess;
pub mod catalog;
pub mod health;
pub mod wizard;

use clap::Args;
use medagent_core::intake::IntakeForm;

/// Intake fields shared by `assess` and `advise`.
///
/// Everything is optional at the clap level so missing values are reported
/// by intake validation (exit 4) rather than as clap usage errors.
#[derive(Args, Debug, Clone, Default)]
pub struct IntakeArgs {
    /// Patient name
    #[arg(long)]
    pub name: Option<String>,
    /// Age in whole years
    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,
    /// Symptom identifier, repeatable (e.g. --symptom fever --symptom cough)
    #[arg(long = "symptom", value_name = "ID")]
    pub symptoms: Vec<String>,
}

impl IntakeArgs {
    pub fn form(&self) -> IntakeForm {
        IntakeForm {
            name: self.name.clone().unwrap_or_default(),
            age: self.age,
            symptoms: self.symptoms.clone(),
        }
    }
}
