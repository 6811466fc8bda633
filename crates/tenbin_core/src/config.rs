//! Scoring oracle configuration.
//!
//! # Responsibility
//! - Resolve endpoint, model, credentials and timeout from the environment.
//!
//! # Invariants
//! - A blank API key is treated as missing.
//! - No timeout is applied unless explicitly configured.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub const DEFAULT_SCORING_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SCORING_MODEL: &str = "gemini-1.5-flash";

const API_KEY_VARS: [&str; 2] = ["TENBIN_GEMINI_API_KEY", "GEMINI_API_KEY"];
const MODEL_VAR: &str = "TENBIN_SCORING_MODEL";
const ENDPOINT_VAR: &str = "TENBIN_SCORING_ENDPOINT";
const TIMEOUT_VAR: &str = "TENBIN_SCORING_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingApiKey,
    InvalidValue { name: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(
                f,
                "scoring API key is not set; expected one of {}",
                API_KEY_VARS.join(", ")
            ),
            Self::InvalidValue { name, value } => write!(f, "invalid value `{value}` for {name}"),
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for the scoring oracle.
#[derive(Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

impl ScoringConfig {
    /// Config with default endpoint/model and no timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_SCORING_ENDPOINT.to_string(),
            model: DEFAULT_SCORING_MODEL.to_string(),
            api_key: api_key.into(),
            timeout_secs: None,
        }
    }

    /// Reads the config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the config through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| non_blank(*name))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(model) = non_blank(MODEL_VAR) {
            config.model = model;
        }
        if let Some(endpoint) = non_blank(ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }
        if let Some(raw) = non_blank(TIMEOUT_VAR) {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

impl Debug for ScoringConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ScoringConfig, DEFAULT_SCORING_MODEL};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        assert_eq!(
            ScoringConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingApiKey
        );
        assert_eq!(
            ScoringConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err(),
            ConfigError::MissingApiKey
        );
    }

    #[test]
    fn app_specific_key_takes_precedence() {
        let config = ScoringConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "generic"),
            ("TENBIN_GEMINI_API_KEY", "specific"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "specific");
        assert_eq!(config.model, DEFAULT_SCORING_MODEL);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn timeout_must_be_positive_integer() {
        let config = ScoringConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("TENBIN_SCORING_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.timeout_secs, Some(30));

        let err = ScoringConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("TENBIN_SCORING_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let rendered = format!("{:?}", ScoringConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
