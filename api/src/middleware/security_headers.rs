use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

/// Stamped on every relay response, errors included. Intake and advisory
/// bodies carry patient details, so nothing may be cached.
pub const HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("x-frame-options", "DENY"),
    ("content-security-policy", "frame-ancestors 'none'"),
    ("cache-control", "no-store"),
];

pub async fn apply(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    response
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::routing::get;
    use axum::{Router, middleware};
    use tower::ServiceExt;

    use super::HEADERS;

    async fn cacheable() -> ([(header::HeaderName, &'static str); 1], &'static str) {
        ([(header::CACHE_CONTROL, "max-age=3600")], "catalog")
    }

    fn app() -> Router {
        Router::new()
            .route("/v1/catalog", get(cacheable))
            .layer(middleware::from_fn(super::apply))
    }

    async fn headers_for(uri: &str) -> (StatusCode, axum::http::HeaderMap) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("request should succeed");
        (response.status(), response.headers().clone())
    }

    #[tokio::test]
    async fn handler_cache_policy_is_overridden() {
        let (status, headers) = headers_for("/v1/catalog").await;
        assert_eq!(status, StatusCode::OK);
        for (name, value) in HEADERS {
            assert_eq!(headers.get(name).map(|v| v.to_str().ok()), Some(Some(value)), "{name}");
        }
    }

    #[tokio::test]
    async fn unmatched_routes_are_covered_too() {
        let (status, headers) = headers_for("/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers.get("cache-control").expect("cache-control"), "no-store");
    }
}
