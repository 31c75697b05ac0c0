use std::time::Duration;

use medagent_core::intake::ValidationError;
use serde_json::json;

/// Upper bound for any single relay call made by the CLI.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub fn to_pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", to_pretty(&err));
    std::process::exit(4);
}

/// Print a local intake validation failure and return the usage exit code.
pub fn report_validation(err: &ValidationError) -> i32 {
    let out = json!({
        "error": "validation_failed",
        "field": err.field(),
        "message": err.to_string()
    });
    eprintln!("{}", to_pretty(&out));
    4
}

/// Join the relay base URL and a route path.
pub fn endpoint(api_url: &str, path: &str) -> Result<reqwest::Url, String> {
    reqwest::Url::parse(&format!("{}{path}", api_url.trim_end_matches('/')))
        .map_err(|e| format!("Invalid URL: {api_url}{path}: {e}"))
}

/// Execute a relay request, print the response, return a structured exit code.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> i32 {
    let url = match endpoint(api_url, path) {
        Ok(u) => u,
        Err(message) => {
            eprintln!("{}", to_pretty(&json!({"error": "cli_error", "message": message})));
            return 4;
        }
    };

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{}", e.without_url()),
                "docs_hint": "Is the relay running? Check MEDAGENT_API_URL."
            });
            eprintln!("{}", to_pretty(&err));
            return 3;
        }
    };

    let status = resp.status().as_u16();
    let exit_code = match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    };

    let resp_body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    if exit_code == 0 {
        println!("{}", to_pretty(&resp_body));
    } else {
        eprintln!("{}", to_pretty(&resp_body));
    }

    exit_code
}

/// Execute a relay request and hand back the decoded body (no printing).
pub async fn raw_api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<&serde_json::Value>,
) -> Result<(u16, serde_json::Value), String> {
    let url = endpoint(api_url, path)?;

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(b);
    }

    let resp = req.send().await.map_err(|e| format!("{}", e.without_url()))?;
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp
        .json()
        .await
        .unwrap_or(json!({"error": "non-json response"}));

    Ok((status, body))
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn server_answering(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn exit_code_follows_status_class() {
        for (status, expected) in [(200, 0), (404, 1), (503, 2)] {
            let server = server_answering(status).await;
            let code = api_request(&server.uri(), reqwest::Method::GET, "/health", None).await;
            assert_eq!(code, expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn unreachable_relay_is_a_connection_error() {
        let code = api_request("http://127.0.0.1:9", reqwest::Method::GET, "/health", None).await;
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn invalid_base_url_is_a_usage_error() {
        let code = api_request("not a url", reqwest::Method::GET, "/health", None).await;
        assert_eq!(code, 4);
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let url = endpoint("http://localhost:3000/", "/v1/catalog").expect("valid");
        assert_eq!(url.as_str(), "http://localhost:3000/v1/catalog");
    }

    #[test]
    fn validation_failures_use_usage_exit_code() {
        assert_eq!(report_validation(&ValidationError::MissingName), 4);
    }
}
