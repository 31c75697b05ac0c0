//! Advisory retrieval: prompt the generation endpoint, fall back to canned advice.
//!
//! `AdvisoryRetriever::get_advisory` never fails. Every transport, status, or
//! schema problem is logged and resolved to the fallback message for the
//! patient's risk category.

use std::future::Future;
use std::time::Duration;

use medagent_core::advisory::{
    AdvisoryResult, FallbackAdvice, GenerateContentRequest, GenerateContentResponse,
    PromptTemplate, RetrievalError,
};
use medagent_core::intake::PatientRecord;
use medagent_core::risk::RiskCategory;
use url::Url;

/// Anything that turns a prompt into generated text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, RetrievalError>> + Send;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Client for a `generateContent`-style endpoint authenticated with `?key=`.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(endpoint: Url, api_key: Option<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            endpoint,
            api_key,
        }
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, RetrievalError> {
        let api_key = self.api_key.as_deref().ok_or(RetrievalError::NotConfigured)?;

        // reqwest errors embed the request URL, which carries the key.
        let response = self
            .http
            .post(self.endpoint.clone())
            .query(&[("key", api_key)])
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RetrievalError::Timeout
                } else {
                    RetrievalError::Transport(err.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status(status.as_u16()));
        }

        let body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RetrievalError::Timeout
                } else {
                    RetrievalError::Malformed(err.without_url().to_string())
                }
            })?;

        body.first_text().map(str::to_string)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

pub struct AdvisoryRetriever<G> {
    generator: G,
    prompt: PromptTemplate,
    fallback: FallbackAdvice,
    budget: Duration,
}

impl<G: TextGenerator> AdvisoryRetriever<G> {
    /// `budget` bounds the whole call, independent of any client-level timeout.
    pub fn new(generator: G, prompt: PromptTemplate, budget: Duration) -> Self {
        Self {
            generator,
            prompt,
            fallback: FallbackAdvice::default(),
            budget,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackAdvice) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn prompt(&self) -> PromptTemplate {
        self.prompt
    }

    pub fn fallback(&self) -> &FallbackAdvice {
        &self.fallback
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_configured()
    }

    pub async fn get_advisory(&self, record: &PatientRecord, risk: RiskCategory) -> AdvisoryResult {
        self.get_advisory_with(record, risk, self.prompt).await
    }

    pub async fn get_advisory_with(
        &self,
        record: &PatientRecord,
        risk: RiskCategory,
        prompt: PromptTemplate,
    ) -> AdvisoryResult {
        let prompt = prompt.render(record);

        let outcome =
            match tokio::time::timeout(self.budget, self.generator.generate(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(RetrievalError::Timeout),
            };

        match outcome {
            Ok(text) => {
                tracing::debug!(risk = %risk, "Generated advisory");
                AdvisoryResult::generated(text)
            }
            Err(err) => {
                tracing::warn!(
                    risk = %risk,
                    kind = err.kind(),
                    error = %err,
                    "Advisory generation failed, serving fallback"
                );
                AdvisoryResult::fallback(risk, &self.fallback)
            }
        }
    }
}
