use medagent_core::intake::validate;
use serde_json::json;

use crate::commands::IntakeArgs;
use crate::relay::IntakeProfile;
use crate::util::{api_request, report_validation};

pub async fn run(api_url: &str, intake: &IntakeArgs) -> i32 {
    let form = intake.form();
    let profile = IntakeProfile::fetch_or_default(api_url).await;
    if let Err(err) = validate(&form, &profile.intake) {
        return report_validation(&err);
    }

    let body = json!({
        "name": form.name,
        "age": form.age,
        "symptoms": form.symptoms,
    });
    api_request(api_url, reqwest::Method::POST, "/v1/assessments", Some(body)).await
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn relay(expected_posts: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/catalog"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/assessments"))
            .and(body_partial_json(json!({"name": "Alex", "age": 30})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"risk": "LOW"})))
            .expect(expected_posts)
            .mount(&server)
            .await;
        server
    }

    fn args(name: Option<&str>, age: Option<i64>, symptoms: &[&str]) -> IntakeArgs {
        IntakeArgs {
            name: name.map(str::to_string),
            age,
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn valid_intake_is_posted() {
        let server = relay(1).await;
        let code = run(&server.uri(), &args(Some("Alex"), Some(30), &["fever"])).await;
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn invalid_intake_never_reaches_the_relay() {
        let server = relay(0).await;
        assert_eq!(run(&server.uri(), &args(None, Some(30), &["fever"])).await, 4);
        assert_eq!(run(&server.uri(), &args(Some("Alex"), Some(120), &["fever"])).await, 4);
        assert_eq!(run(&server.uri(), &args(Some("Alex"), Some(30), &[])).await, 4);
        assert_eq!(run(&server.uri(), &args(Some("Alex"), Some(30), &["rash"])).await, 4);
    }
}
