use std::sync::Arc;

use medagent_core::advisory::PromptTemplate;
use medagent_core::intake::IntakeConfig;
use medagent_core::risk::RiskRules;

use crate::advisory::{AdvisoryRetriever, GeminiClient};
use crate::config::RelayConfig;

/// Extra time granted on top of the HTTP client timeout before the
/// retriever gives up on its own.
const BUDGET_SLACK_MS: u64 = 500;

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeConfig>,
    pub rules: Arc<RiskRules>,
    pub advisory: Arc<AdvisoryRetriever<GeminiClient>>,
}

impl AppState {
    pub fn from_config(config: &RelayConfig) -> Self {
        let client = GeminiClient::new(
            config.generation_url.clone(),
            config.generation_api_key.clone(),
            config.generation_timeout,
        );
        let prompt = PromptTemplate {
            style: config.prompt_style,
            ..PromptTemplate::default()
        };
        let budget = config.generation_timeout + std::time::Duration::from_millis(BUDGET_SLACK_MS);

        Self {
            intake: Arc::new(config.intake()),
            rules: Arc::new(config.catalog_variant.rules()),
            advisory: Arc::new(
                AdvisoryRetriever::new(client, prompt, budget)
                    .with_fallback(config.fallback.clone()),
            ),
        }
    }
}
