use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Redirect plain-HTTP requests to HTTPS based on `X-Forwarded-Proto`.
///
/// Enabled with `MEDAGENT_REQUIRE_HTTPS=true` when the relay runs behind a
/// TLS-terminating proxy. Every response gets an HSTS header.
pub async fn require_https(req: Request, next: Next) -> Response {
    let forwarded_http = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("http"));

    if forwarded_http {
        if let Some(uri) = https_location(&req) {
            let mut response =
                (StatusCode::MOVED_PERMANENTLY, [("location", uri.to_string())]).into_response();
            add_hsts_header(&mut response);
            return response;
        }
    }

    let mut response = next.run(req).await;
    add_hsts_header(&mut response);
    response
}

fn https_location(req: &Request) -> Option<Uri> {
    let host = req
        .headers()
        .get("host")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("https://{host}{path_and_query}").parse().ok()
}

fn add_hsts_header(response: &mut Response) {
    response.headers_mut().insert(
        "strict-transport-security",
        HeaderValue::from_static("max-age=63072000; includeSubDomains"),
    );
}
