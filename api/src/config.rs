use std::time::Duration;

use medagent_core::advisory::{FallbackAdvice, PromptStyle};
use medagent_core::intake::{AgeBounds, DEFAULT_MAX_AGE, DEFAULT_MIN_AGE, IntakeConfig};
use medagent_core::risk::RiskRules;
use medagent_core::symptoms::{DIFFICULTY_BREATHING, SHORTNESS_OF_BREATH, SymptomCatalog};
use url::Url;

pub const DEFAULT_GENERATION_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
pub const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not a valid {expected}: '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("MEDAGENT_MIN_AGE ({min}) must not exceed MEDAGENT_MAX_AGE ({max})")]
    InvertedAgeBounds { min: u8, max: u8 },
}

/// Which symptom checklist the relay serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogVariant {
    /// Eight entries with "Shortness of Breath" as the critical symptom
    Standard,
    /// Eight entries with "Difficulty Breathing" as the critical symptom
    Respiratory,
}

impl CatalogVariant {
    pub fn catalog(self) -> SymptomCatalog {
        match self {
            CatalogVariant::Standard => SymptomCatalog::default(),
            CatalogVariant::Respiratory => SymptomCatalog::respiratory_variant(),
        }
    }

    pub fn rules(self) -> RiskRules {
        match self {
            CatalogVariant::Standard => RiskRules::with_critical_symptom(SHORTNESS_OF_BREATH),
            CatalogVariant::Respiratory => RiskRules::with_critical_symptom(DIFFICULTY_BREATHING),
        }
    }
}

/// Relay settings. The generation API key lives here and nowhere else.
#[derive(Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub generation_url: Url,
    pub generation_api_key: Option<String>,
    pub generation_timeout: Duration,
    pub age_bounds: AgeBounds,
    pub catalog_variant: CatalogVariant,
    pub prompt_style: PromptStyle,
    pub fallback: FallbackAdvice,
    pub require_https: bool,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("port", &self.port)
            .field("generation_url", &self.generation_url.as_str())
            .field(
                "generation_api_key",
                &self.generation_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("generation_timeout", &self.generation_timeout)
            .field("age_bounds", &self.age_bounds)
            .field("catalog_variant", &self.catalog_variant)
            .field("prompt_style", &self.prompt_style)
            .field("fallback", &self.fallback)
            .field("require_https", &self.require_https)
            .finish()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = parse_or(get("PORT"), "PORT", "port number", DEFAULT_PORT)?;

        let generation_url = match get("MEDAGENT_GENERATION_URL") {
            Some(raw) => Url::parse(&raw).map_err(|_| ConfigError::Invalid {
                key: "MEDAGENT_GENERATION_URL",
                expected: "URL",
                value: raw,
            })?,
            None => Url::parse(DEFAULT_GENERATION_URL).map_err(|_| ConfigError::Invalid {
                key: "MEDAGENT_GENERATION_URL",
                expected: "URL",
                value: DEFAULT_GENERATION_URL.to_string(),
            })?,
        };

        let timeout_ms = parse_or(
            get("MEDAGENT_GENERATION_TIMEOUT_MS"),
            "MEDAGENT_GENERATION_TIMEOUT_MS",
            "duration in milliseconds",
            DEFAULT_GENERATION_TIMEOUT_MS,
        )?;

        let min = parse_or(get("MEDAGENT_MIN_AGE"), "MEDAGENT_MIN_AGE", "age", DEFAULT_MIN_AGE)?;
        let max = parse_or(get("MEDAGENT_MAX_AGE"), "MEDAGENT_MAX_AGE", "age", DEFAULT_MAX_AGE)?;
        let age_bounds =
            AgeBounds::new(min, max).map_err(|_| ConfigError::InvertedAgeBounds { min, max })?;

        let catalog_variant = match get("MEDAGENT_CATALOG").as_deref() {
            None | Some("standard") => CatalogVariant::Standard,
            Some("respiratory") => CatalogVariant::Respiratory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "MEDAGENT_CATALOG",
                    expected: "catalog variant (standard|respiratory)",
                    value: other.to_string(),
                });
            }
        };

        let prompt_style = match get("MEDAGENT_PROMPT_STYLE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "MEDAGENT_PROMPT_STYLE",
                expected: "prompt style (named|anonymous)",
                value: raw,
            })?,
            None => PromptStyle::default(),
        };

        let defaults = FallbackAdvice::default();
        let fallback = FallbackAdvice {
            low: get("MEDAGENT_FALLBACK_LOW").unwrap_or(defaults.low),
            moderate: get("MEDAGENT_FALLBACK_MODERATE").unwrap_or(defaults.moderate),
            high: get("MEDAGENT_FALLBACK_HIGH").unwrap_or(defaults.high),
        };

        Ok(Self {
            port,
            generation_url,
            generation_api_key: get("MEDAGENT_GENERATION_API_KEY"),
            generation_timeout: Duration::from_millis(timeout_ms),
            age_bounds,
            catalog_variant,
            prompt_style,
            fallback,
            require_https: get("MEDAGENT_REQUIRE_HTTPS").as_deref() == Some("true"),
        })
    }

    pub fn intake(&self) -> IntakeConfig {
        IntakeConfig {
            age_bounds: self.age_bounds,
            catalog: self.catalog_variant.catalog(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<RelayConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("defaults are valid");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.generation_url.as_str(), DEFAULT_GENERATION_URL);
        assert!(config.generation_api_key.is_none());
        assert_eq!(config.age_bounds, AgeBounds::default());
        assert_eq!(config.catalog_variant, CatalogVariant::Standard);
        assert_eq!(config.prompt_style, PromptStyle::Named);
        assert!(!config.require_https);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("MEDAGENT_GENERATION_API_KEY", " secret "),
            ("MEDAGENT_GENERATION_TIMEOUT_MS", "250"),
            ("MEDAGENT_MIN_AGE", "1"),
            ("MEDAGENT_MAX_AGE", "120"),
            ("MEDAGENT_CATALOG", "respiratory"),
            ("MEDAGENT_PROMPT_STYLE", "anonymous"),
            ("MEDAGENT_REQUIRE_HTTPS", "true"),
        ])
        .expect("valid overrides");

        assert_eq!(config.port, 8080);
        assert_eq!(config.generation_api_key.as_deref(), Some("secret"));
        assert_eq!(config.generation_timeout, Duration::from_millis(250));
        assert_eq!(config.age_bounds, AgeBounds { min: 1, max: 120 });
        assert_eq!(config.catalog_variant.rules().critical_symptom, DIFFICULTY_BREATHING);
        assert_eq!(config.prompt_style, PromptStyle::Anonymous);
        assert!(config.require_https);
    }

    #[test]
    fn fallback_messages_can_be_overridden_per_category() {
        let config = config_from(&[("MEDAGENT_FALLBACK_HIGH", "Call emergency services now.")])
            .expect("valid");
        assert_eq!(config.fallback.high, "Call emergency services now.");
        assert_eq!(config.fallback.low, FallbackAdvice::default().low);
    }

    #[test]
    fn blank_key_counts_as_unset() {
        let config = config_from(&[("MEDAGENT_GENERATION_API_KEY", "   ")]).expect("valid");
        assert!(config.generation_api_key.is_none());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config_from(&[("PORT", "http")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("MEDAGENT_MIN_AGE", "50"), ("MEDAGENT_MAX_AGE", "10")]),
            Err(ConfigError::InvertedAgeBounds { .. })
        ));
        assert!(config_from(&[("MEDAGENT_CATALOG", "dental")]).is_err());
        assert!(config_from(&[("MEDAGENT_GENERATION_URL", "not a url")]).is_err());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = config_from(&[("MEDAGENT_GENERATION_API_KEY", "sk-live-123")]).expect("valid");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-live-123"));
        assert!(rendered.contains("<redacted>"));
    }
}
