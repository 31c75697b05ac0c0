use medagent_core::intake::validate;
use serde_json::json;

use crate::commands::IntakeArgs;
use crate::relay::{IntakeProfile, RelayAdvisor};
use crate::session::Advisor;
use crate::util::{report_validation, to_pretty};

/// Classify locally and print the advisory. Advisory problems resolve to the
/// fallback text, so only validation can make this fail.
pub async fn run(api_url: &str, intake: &IntakeArgs, anonymous: bool) -> i32 {
    let profile = IntakeProfile::fetch_or_default(api_url).await;
    let record = match validate(&intake.form(), &profile.intake) {
        Ok(record) => record,
        Err(err) => return report_validation(&err),
    };
    let risk = profile.rules.classify(&record);

    let advisory = RelayAdvisor::for_profile(api_url, &profile)
        .anonymous(anonymous)
        .advise(&record, risk)
        .await;

    let output = json!({
        "patient": record,
        "risk": risk,
        "severity": risk.severity(),
        "guidance": risk.guidance(),
        "advisory": advisory,
    });
    println!("{}", to_pretty(&output));
    0
}
