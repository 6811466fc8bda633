use std::cell::RefCell;
use tenbin_core::{
    GeminiOracle, OracleError, PriorityDeriver, PriorityScale, ScoringConfig, ScoringError,
    ScoringOracle, TaskType, SCORING_FAILED_MESSAGE,
};

/// Oracle that replays one canned reply and keeps every prompt it saw.
struct CannedOracle {
    reply: Result<String, OracleError>,
    prompts: RefCell<Vec<String>>,
}

impl CannedOracle {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    fn failing(err: OracleError) -> Self {
        Self {
            reply: Err(err),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl ScoringOracle for CannedOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.reply.clone()
    }
}

#[test]
fn plain_json_reply_yields_priority() {
    let oracle = CannedOracle::replying(r#"{"priority": 9}"#);
    let deriver = PriorityDeriver::new(&oracle);

    let priority = deriver.derive_priority("病院の予約", TaskType::Work).unwrap();
    assert_eq!(priority.get(), 9);

    let prompts = oracle.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("病院の予約"));
    assert!(prompts[0].contains("work"));
}

#[test]
fn fenced_reply_with_surrounding_prose_is_accepted() {
    let oracle = CannedOracle::replying(
        "Sure, here is the score:\n```json\n{\"priority\": 4}\n```\nLet me know if you need more.",
    );
    let deriver = PriorityDeriver::new(&oracle);

    assert_eq!(deriver.derive_priority("laundry", TaskType::Work).unwrap().get(), 4);
}

#[test]
fn out_of_range_priority_is_rejected_not_clamped() {
    for reply in [r#"{"priority": 11}"#, r#"{"priority": 0}"#, r#"{"priority": -1}"#] {
        let deriver = PriorityDeriver::new(CannedOracle::replying(reply));
        let err = deriver.derive_priority("trip", TaskType::Play).unwrap_err();
        assert!(
            matches!(err, ScoringError::InvalidPriority { .. }),
            "unexpected error for {reply}: {err}"
        );
    }
}

#[test]
fn non_json_reply_is_malformed() {
    let deriver = PriorityDeriver::new(CannedOracle::replying("I think about a seven."));
    let err = deriver.derive_priority("trip", TaskType::Play).unwrap_err();
    assert!(matches!(err, ScoringError::Malformed { .. }));
}

#[test]
fn non_integer_priority_is_invalid() {
    for reply in [r#"{"priority": "7"}"#, r#"{"priority": 7.5}"#, r#"{"score": 7}"#] {
        let deriver = PriorityDeriver::new(CannedOracle::replying(reply));
        let err = deriver.derive_priority("trip", TaskType::Play).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidPriority { .. }));
    }
}

#[test]
fn every_failure_maps_to_the_same_user_message() {
    let failures = [
        CannedOracle::failing(OracleError::Status {
            code: 429,
            body: "quota".to_string(),
        }),
        CannedOracle::replying("nope"),
        CannedOracle::replying(r#"{"priority": 42}"#),
    ];

    for oracle in failures {
        let deriver = PriorityDeriver::new(oracle);
        let err = deriver.derive_priority("trip", TaskType::Play).unwrap_err();
        assert_eq!(err.user_message(), SCORING_FAILED_MESSAGE);
    }
}

#[test]
fn legacy_scale_bounds_oracle_replies() {
    let deriver = PriorityDeriver::with_scale(
        CannedOracle::replying(r#"{"priority": 4}"#),
        PriorityScale::MANUAL_LEGACY,
    );
    assert_eq!(deriver.scale(), PriorityScale::MANUAL_LEGACY);
    assert_eq!(deriver.derive_priority("trip", TaskType::Play).unwrap().get(), 4);
}

#[test]
fn unreachable_endpoint_surfaces_transport_error() {
    let mut config = ScoringConfig::new("test-key");
    config.endpoint = "http://127.0.0.1:9".to_string();
    config.timeout_secs = Some(2);
    let deriver = PriorityDeriver::new(GeminiOracle::new(&config));

    let err = deriver.derive_priority("trip", TaskType::Play).unwrap_err();
    assert!(matches!(
        err,
        ScoringError::Oracle(OracleError::Transport { .. })
    ));
}
