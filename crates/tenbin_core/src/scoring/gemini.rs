//! Generative-language REST client used as the production scoring oracle.
//!
//! # Responsibility
//! - Send one `generateContent` request per prompt over blocking HTTP.
//! - Reduce the response envelope to its candidate text.
//!
//! # Invariants
//! - The API key travels in a header, never in the URL or in logs.
//! - No retry and no timeout beyond what `ScoringConfig` sets.

use crate::config::ScoringConfig;
use crate::scoring::{OracleError, ScoringOracle};
use log::debug;
use serde_json::{json, Value};
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Scoring oracle backed by the hosted generative-language API.
pub struct GeminiOracle {
    agent: ureq::Agent,
    url: String,
    api_key: String,
}

impl GeminiOracle {
    pub fn new(config: &ScoringConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Self {
            agent: builder.build(),
            url: generate_content_url(&config.endpoint, &config.model),
            api_key: config.api_key.clone(),
        }
    }
}

impl ScoringOracle for GeminiOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        debug!("event=oracle_request module=scoring status=start prompt_chars={}", prompt.chars().count());

        let response = self
            .agent
            .post(&self.url)
            .set("x-goog-api-key", &self.api_key)
            .send_json(request_body(prompt));

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(OracleError::Status {
                    code,
                    body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(OracleError::Transport {
                    message: transport.to_string(),
                });
            }
        };

        let envelope: Value = response
            .into_json()
            .map_err(|err| OracleError::BadEnvelope {
                message: err.to_string(),
            })?;
        candidate_text(&envelope)
    }
}

fn generate_content_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model.trim()
    )
}

fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "temperature": 0
        }
    })
}

/// Concatenates `candidates[0].content.parts[*].text`.
fn candidate_text(envelope: &Value) -> Result<String, OracleError> {
    let parts = envelope
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| OracleError::BadEnvelope {
            message: "missing candidates[0].content.parts".to_string(),
        })?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<String>();

    if text.trim().is_empty() {
        return Err(OracleError::EmptyResponse);
    }
    Ok(text)
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    if value.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
