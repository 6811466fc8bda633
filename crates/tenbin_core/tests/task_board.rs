use std::cell::Cell;
use tenbin_core::db::open_db_in_memory;
use tenbin_core::{
    BoardError, KeyValueStore, OracleError, Priority, PriorityDeriver, ScoringOracle,
    SqliteKeyValueStore, TaskBoard, TaskPatch, TaskStore, TaskType, Tilt, TASKS_KEY,
};

struct FixedOracle {
    reply: &'static str,
    calls: Cell<usize>,
}

impl FixedOracle {
    fn new(reply: &'static str) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
        }
    }
}

impl ScoringOracle for FixedOracle {
    fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.reply.to_string())
    }
}

fn p(value: u8) -> Priority {
    Priority::new(value).unwrap()
}

#[test]
fn scored_hospital_booking_weighs_down_work_side() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let mut board = TaskBoard::load(&kv);
    let before = board.balance();

    let oracle = FixedOracle::new(r#"{"priority": 9}"#);
    let deriver = PriorityDeriver::new(&oracle);
    let task = board
        .add_scored_task("病院の予約", TaskType::Work, &deriver)
        .unwrap();

    assert_eq!(task.priority.get(), 9);
    assert_eq!(task.title, "病院の予約");
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.balance().work_sum, before.work_sum + 9);
    assert_eq!(board.balance().tilt(), Tilt::Work);
    assert_eq!(oracle.calls.get(), 1);
}

#[test]
fn scoring_failure_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let mut board = TaskBoard::load(&kv);
    board.add_task("existing", TaskType::Play, p(2)).unwrap();
    let raw_before = kv.get_item(TASKS_KEY).unwrap();

    for reply in [r#"{"priority": 11}"#, "not json at all"] {
        let deriver = PriorityDeriver::new(FixedOracle::new(reply));
        let err = board
            .add_scored_task("trip", TaskType::Play, &deriver)
            .unwrap_err();
        assert!(matches!(err, BoardError::Scoring(_)));
        assert_eq!(err.user_message(), "failed to obtain priority");
    }

    assert_eq!(kv.get_item(TASKS_KEY).unwrap(), raw_before);
    assert_eq!(board.tasks().len(), 1);
}

#[test]
fn blank_text_fails_before_oracle_is_called() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let mut board = TaskBoard::load(&kv);

    let oracle = FixedOracle::new(r#"{"priority": 5}"#);
    let deriver = PriorityDeriver::new(&oracle);
    let err = board
        .add_scored_task("   ", TaskType::Work, &deriver)
        .unwrap_err();

    assert!(matches!(err, BoardError::Validation(_)));
    assert_eq!(oracle.calls.get(), 0);
    assert!(board.tasks().is_empty());
}

#[test]
fn snapshot_tracks_every_mutation() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let mut board = TaskBoard::load(&kv);

    let work = board.add_task("report", TaskType::Work, p(4)).unwrap();
    let play = board.add_task("movie night", TaskType::Play, p(6)).unwrap();
    assert_eq!(board.tasks()[0].id, play.id);
    assert_eq!(board.balance().tilt(), Tilt::Play);

    let patch = TaskPatch {
        priority: Some(p(8)),
        ..TaskPatch::default()
    };
    board.update_task(&work.id, &patch).unwrap();
    assert_eq!(board.task(&work.id).unwrap().priority.get(), 8);
    assert_eq!(board.balance().work_sum, 8);
    assert_eq!(board.balance().tilt(), Tilt::Work);

    board.remove_task(&play.id).unwrap();
    assert!(board.task(&play.id).is_none());
    assert_eq!(board.balance().play_count, 0);

    board.clear_all().unwrap();
    assert!(board.tasks().is_empty());
    assert_eq!(board.balance().tilt(), Tilt::Level);
}

#[test]
fn refresh_picks_up_writes_made_elsewhere() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let mut board = TaskBoard::load(&kv);

    let other = TaskStore::new(&kv);
    other.add_task("from another screen", TaskType::Work, p(3)).unwrap();
    assert!(board.tasks().is_empty());

    board.refresh();
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.balance().work_sum, 3);
}

#[test]
fn update_with_blank_title_surfaces_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();
    let mut board = TaskBoard::load(&kv);
    let task = board.add_task("keep", TaskType::Work, p(2)).unwrap();

    let patch = TaskPatch {
        title: Some(String::new()),
        ..TaskPatch::default()
    };
    let err = board.update_task(&task.id, &patch).unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));
    assert_eq!(board.task(&task.id).unwrap().title, "keep");
}
