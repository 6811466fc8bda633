//! Priority derivation.
//!
//! # Responsibility
//! - Turn a task description and category into a bounded `Priority`.
//! - Support manual selection and oracle-assisted scoring.
//!
//! # Invariants
//! - One oracle request per derivation; no retries.
//! - Out-of-range or malformed oracle output is an error, never clamped
//!   and never replaced by a default priority.
//! - Log events never include the task text or the raw oracle reply.

pub mod gemini;
pub mod parse;
pub mod prompt;

use crate::model::task::{Priority, PriorityScale, TaskType, TaskValidationError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub use gemini::GeminiOracle;
pub use parse::{extract_json_payload, parse_priority};
pub use prompt::build_priority_prompt;

/// User-facing message for every scoring failure.
pub const SCORING_FAILED_MESSAGE: &str = "failed to obtain priority";

/// Transport/API failure from a scoring oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Request never produced an HTTP response.
    Transport { message: String },
    /// Oracle answered with a non-success status.
    Status { code: u16, body: String },
    /// Response envelope did not have the expected shape.
    BadEnvelope { message: String },
    /// Envelope was well-formed but carried no text.
    EmptyResponse,
}

impl Display for OracleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "oracle request failed: {message}"),
            Self::Status { code, body } => write!(f, "oracle returned status {code}: {body}"),
            Self::BadEnvelope { message } => write!(f, "unexpected oracle response: {message}"),
            Self::EmptyResponse => write!(f, "oracle returned no text"),
        }
    }
}

impl Error for OracleError {}

/// Failure to obtain a priority from the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    Oracle(OracleError),
    /// Reply did not contain a parseable JSON object.
    Malformed { reason: String },
    /// `priority` was missing a valid integer in range.
    InvalidPriority { value: String },
}

impl ScoringError {
    /// Generic message shown to the user regardless of cause.
    pub fn user_message(&self) -> &'static str {
        SCORING_FAILED_MESSAGE
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Oracle(OracleError::Transport { .. }) => "oracle_transport",
            Self::Oracle(OracleError::Status { .. }) => "oracle_status",
            Self::Oracle(OracleError::BadEnvelope { .. }) => "oracle_bad_envelope",
            Self::Oracle(OracleError::EmptyResponse) => "oracle_empty",
            Self::Malformed { .. } => "malformed_reply",
            Self::InvalidPriority { .. } => "invalid_priority",
        }
    }
}

impl Display for ScoringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oracle(err) => write!(f, "{err}"),
            Self::Malformed { reason } => write!(f, "malformed priority reply: {reason}"),
            Self::InvalidPriority { value } => write!(f, "invalid priority: {value}"),
        }
    }
}

impl Error for ScoringError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Oracle(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OracleError> for ScoringError {
    fn from(value: OracleError) -> Self {
        Self::Oracle(value)
    }
}

/// Black-box service mapping a prompt to free-text output.
pub trait ScoringOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

impl<O: ScoringOracle + ?Sized> ScoringOracle for &O {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        (**self).complete(prompt)
    }
}

impl<O: ScoringOracle + ?Sized> ScoringOracle for Box<O> {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        (**self).complete(prompt)
    }
}

/// Derives task priorities through a scoring oracle.
pub struct PriorityDeriver<O: ScoringOracle> {
    oracle: O,
    scale: PriorityScale,
}

impl<O: ScoringOracle> PriorityDeriver<O> {
    /// Creates a deriver scoring on the full `1..=10` scale.
    pub fn new(oracle: O) -> Self {
        Self::with_scale(oracle, PriorityScale::SCORED)
    }

    pub fn with_scale(oracle: O, scale: PriorityScale) -> Self {
        Self { oracle, scale }
    }

    pub fn scale(&self) -> PriorityScale {
        self.scale
    }

    /// Asks the oracle for a priority and validates the reply.
    ///
    /// # Errors
    /// - `Oracle` when the request fails.
    /// - `Malformed` when the reply holds no parseable JSON object.
    /// - `InvalidPriority` when `priority` is missing, not an integer, or
    ///   outside the scale.
    pub fn derive_priority(&self, text: &str, kind: TaskType) -> Result<Priority, ScoringError> {
        let started_at = Instant::now();
        let prompt = build_priority_prompt(text, kind, self.scale);

        let result = self
            .oracle
            .complete(&prompt)
            .map_err(ScoringError::from)
            .and_then(|reply| parse_priority(&reply, self.scale));

        match &result {
            Ok(priority) => info!(
                "event=priority_derive module=scoring status=ok kind={kind} priority={priority} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=priority_derive module=scoring status=error kind={kind} duration_ms={} error_code={}",
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }

    /// Validates a manually selected priority against `scale`.
    ///
    /// Manual selection never consults the oracle.
    pub fn manual(scale: PriorityScale, value: i64) -> Result<Priority, TaskValidationError> {
        scale.priority(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{OracleError, PriorityDeriver, ScoringError, ScoringOracle};
    use crate::model::task::{PriorityScale, TaskType};
    use std::cell::RefCell;

    struct RecordingOracle {
        reply: Result<String, OracleError>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScoringOracle for RecordingOracle {
        fn complete(&self, prompt: &str) -> Result<String, OracleError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn oracle(reply: Result<&str, OracleError>) -> RecordingOracle {
        RecordingOracle {
            reply: reply.map(str::to_string),
            prompts: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn derive_calls_oracle_exactly_once() {
        let deriver = PriorityDeriver::new(oracle(Ok(r#"{"priority": 6}"#)));
        let priority = deriver.derive_priority("dentist", TaskType::Work).unwrap();
        assert_eq!(priority.get(), 6);
        assert_eq!(deriver.oracle.prompts.borrow().len(), 1);
    }

    #[test]
    fn oracle_failure_is_not_retried() {
        let deriver = PriorityDeriver::new(oracle(Err(OracleError::EmptyResponse)));
        let err = deriver.derive_priority("dentist", TaskType::Work).unwrap_err();
        assert_eq!(err, ScoringError::Oracle(OracleError::EmptyResponse));
        assert_eq!(err.user_message(), "failed to obtain priority");
        assert_eq!(deriver.oracle.prompts.borrow().len(), 1);
    }

    #[test]
    fn error_codes_carry_no_reply_content() {
        let err = ScoringError::InvalidPriority {
            value: "string".to_string(),
        };
        assert_eq!(err.code(), "invalid_priority");
        let err = ScoringError::Oracle(OracleError::Status {
            code: 500,
            body: "echoed prompt".to_string(),
        });
        assert_eq!(err.code(), "oracle_status");
    }

    #[test]
    fn legacy_scale_rejects_values_above_four() {
        let deriver =
            PriorityDeriver::with_scale(oracle(Ok(r#"{"priority": 5}"#)), PriorityScale::MANUAL_LEGACY);
        let err = deriver.derive_priority("karaoke", TaskType::Play).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidPriority { .. }));
    }

    #[test]
    fn manual_selection_validates_scale() {
        let priority =
            PriorityDeriver::<RecordingOracle>::manual(PriorityScale::MANUAL_LEGACY, 4).unwrap();
        assert_eq!(priority.get(), 4);
        assert!(PriorityDeriver::<RecordingOracle>::manual(PriorityScale::MANUAL_LEGACY, 7).is_err());
    }
}
