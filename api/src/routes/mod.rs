pub mod advisory;
pub mod assessments;
pub mod catalog;
pub mod health;

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, Response};
    use serde_json::Value;

    use crate::config::RelayConfig;
    use crate::state::AppState;

    /// State with the given overrides on top of an empty environment.
    pub fn state_with(pairs: &[(&str, &str)]) -> AppState {
        let config = RelayConfig::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .expect("test config should be valid");
        AppState::from_config(&config)
    }

    pub fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }
}
