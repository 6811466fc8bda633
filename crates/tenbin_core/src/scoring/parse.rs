//! Oracle reply parsing.
//!
//! Two stages: a strict JSON parse of the whole trimmed reply, then, only
//! if that fails, the first fenced code block. Anything else is an error.

use crate::model::task::{Priority, PriorityScale};
use crate::scoring::ScoringError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[ \t]*(?:json|JSON)?[ \t]*\r?\n?(.*?)```").expect("valid fenced block regex")
});

/// Extracts the JSON value carried by an oracle reply.
pub fn extract_json_payload(raw: &str) -> Result<Value, ScoringError> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let Some(block) = FENCED_BLOCK_RE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
    else {
        return Err(ScoringError::Malformed {
            reason: "reply is not JSON and has no fenced block".to_string(),
        });
    };

    serde_json::from_str::<Value>(block.as_str().trim()).map_err(|err| ScoringError::Malformed {
        reason: format!("fenced block is not JSON: {err}"),
    })
}

/// Parses `{"priority": <integer>}` out of an oracle reply.
///
/// # Errors
/// - `Malformed` when no JSON object can be extracted.
/// - `InvalidPriority` when `priority` is missing, not an integer, or
///   outside `scale`.
pub fn parse_priority(raw: &str, scale: PriorityScale) -> Result<Priority, ScoringError> {
    let payload = extract_json_payload(raw)?;
    let Some(object) = payload.as_object() else {
        return Err(ScoringError::Malformed {
            reason: "reply JSON is not an object".to_string(),
        });
    };

    let Some(field) = object.get("priority") else {
        return Err(ScoringError::InvalidPriority {
            value: "missing".to_string(),
        });
    };

    let Some(value) = field.as_i64() else {
        // the field may echo task text back, so only its JSON type is kept
        return Err(ScoringError::InvalidPriority {
            value: json_type_name(field).to_string(),
        });
    };

    scale
        .priority(value)
        .map_err(|_| ScoringError::InvalidPriority {
            value: value.to_string(),
        })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_json_payload, parse_priority};
    use crate::model::task::PriorityScale;
    use crate::scoring::ScoringError;
    use serde_json::json;

    #[test]
    fn strict_parse_wins_over_fence_scan() {
        let value = extract_json_payload("  {\"priority\": 3}\n").unwrap();
        assert_eq!(value, json!({"priority": 3}));
    }

    #[test]
    fn fenced_block_is_used_as_fallback() {
        let reply = "Here you go:\n```json\n{\"priority\": 8}\n```\nThanks";
        assert_eq!(parse_priority(reply, PriorityScale::SCORED).unwrap().get(), 8);

        let bare = "```\n{\"priority\": 2}\n```";
        assert_eq!(parse_priority(bare, PriorityScale::SCORED).unwrap().get(), 2);
    }

    #[test]
    fn out_of_range_is_rejected_not_clamped() {
        for reply in [r#"{"priority": 11}"#, r#"{"priority": 0}"#, r#"{"priority": -3}"#] {
            let err = parse_priority(reply, PriorityScale::SCORED).unwrap_err();
            assert!(matches!(err, ScoringError::InvalidPriority { .. }), "{reply}");
        }
    }

    #[test]
    fn non_integer_priorities_are_rejected() {
        for reply in [
            r#"{"priority": 7.5}"#,
            r#"{"priority": "7"}"#,
            r#"{"priority": null}"#,
            r#"{"score": 7}"#,
        ] {
            let err = parse_priority(reply, PriorityScale::SCORED).unwrap_err();
            assert!(matches!(err, ScoringError::InvalidPriority { .. }), "{reply}");
        }
    }

    #[test]
    fn invalid_priority_reports_json_type_not_content() {
        let reply = r#"{"priority": "病院の予約 is 7"}"#;
        let err = parse_priority(reply, PriorityScale::SCORED).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidPriority {
                value: "string".to_string()
            }
        );
        assert!(!err.to_string().contains("病院の予約"));

        let err = parse_priority(r#"{"priority": 7.5}"#, PriorityScale::SCORED).unwrap_err();
        assert_eq!(
            err,
            ScoringError::InvalidPriority {
                value: "float".to_string()
            }
        );
    }

    #[test]
    fn prose_without_json_is_malformed() {
        let err = parse_priority("I think this is a 7.", PriorityScale::SCORED).unwrap_err();
        assert!(matches!(err, ScoringError::Malformed { .. }));

        let err = parse_priority("```json\nnot json\n```", PriorityScale::SCORED).unwrap_err();
        assert!(matches!(err, ScoringError::Malformed { .. }));

        let err = parse_priority("[7]", PriorityScale::SCORED).unwrap_err();
        assert!(matches!(err, ScoringError::Malformed { .. }));
    }
}
