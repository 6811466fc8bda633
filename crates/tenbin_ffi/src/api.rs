//! FFI use-case API for the mobile UI.
//!
//! # Responsibility
//! - Expose stable, screen-level functions to Dart via FRB.
//! - Keep error semantics simple: envelopes with a message, never panics.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Mutating calls are serialized through `WRITE_LOCK`.
//! - Scoring failures surface only the generic scoring message.
//!
//! # See also
//! - docs/architecture/logging.md

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tenbin_core::db::open_db;
use tenbin_core::model::task::format_timestamp;
use tenbin_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    is_first_launch as is_first_launch_inner, mark_launched as mark_launched_inner,
    ping as ping_inner, Balance, BoardError, ConfigError, GeminiOracle, Priority, PriorityDeriver,
    ScoringConfig, SqliteKeyValueStore, Task, TaskBoard, TaskPatch, TaskStore, TaskType, Tilt,
    SCORING_FAILED_MESSAGE,
};

const DB_FILE_NAME: &str = "tenbin.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static WRITE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task row as rendered by list and edit screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    /// `work|play`.
    pub kind: String,
    pub priority: u8,
    /// RFC 3339 with milliseconds.
    pub created_at: String,
    pub updated_at: String,
}

/// Generic action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Created or edited task, when the action produced one.
    pub task: Option<TaskItem>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<TaskItem>) -> Self {
        Self {
            ok: true,
            task,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Aggregates for the home-screen scale.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSummary {
    pub work_sum: u32,
    pub play_sum: u32,
    pub work_count: u32,
    pub play_count: u32,
    pub work_ratio: f64,
    pub play_ratio: f64,
    /// `work|play|level`.
    pub tilt: String,
}

/// Lists all tasks, newest first.
///
/// # FFI contract
/// - Never fails; unreadable or corrupt storage yields an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list() -> Vec<TaskItem> {
    with_board(|board| Ok(board.tasks().iter().map(to_task_item).collect()))
        .unwrap_or_else(|err| {
            warn!("event=ffi_tasks_list module=ffi status=fallback error={err}");
            Vec::new()
        })
}

/// Looks up one task for the edit screen.
#[flutter_rust_bridge::frb(sync)]
pub fn task_get(id: String) -> Option<TaskItem> {
    with_board(|board| Ok(board.task(id.as_str()).map(to_task_item)))
        .ok()
        .flatten()
}

/// Adds a task with a manually chosen priority (`1..=10`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(text: String, kind: String, priority: u8) -> TaskActionResponse {
    let Some(kind) = TaskType::parse(&kind) else {
        return TaskActionResponse::failure(format!("task_add failed: unknown kind `{kind}`"));
    };
    let priority = match Priority::new(priority) {
        Ok(priority) => priority,
        Err(err) => return TaskActionResponse::failure(format!("task_add failed: {err}")),
    };

    let _guard = lock_writes();
    match with_board(|board| board.add_task(&text, kind, priority).map_err(board_message)) {
        Ok(task) => TaskActionResponse::success("Task added.", Some(to_task_item(&task))),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Scores `text` through the configured oracle, then adds the task.
///
/// # FFI contract
/// - Async in FRB: performs one blocking network request.
/// - Any scoring failure returns the generic scoring message and stores nothing.
pub fn task_add_scored(text: String, kind: String) -> TaskActionResponse {
    add_scored_with_config(&text, &kind, ScoringConfig::from_env())
}

fn add_scored_with_config(
    text: &str,
    kind: &str,
    config: Result<ScoringConfig, ConfigError>,
) -> TaskActionResponse {
    let Some(kind) = TaskType::parse(kind) else {
        return TaskActionResponse::failure(format!("task_add_scored failed: unknown kind `{kind}`"));
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            warn!("event=ffi_task_add_scored module=ffi status=error error_code=config error={err}");
            return TaskActionResponse::failure(SCORING_FAILED_MESSAGE);
        }
    };
    let deriver = PriorityDeriver::new(GeminiOracle::new(&config));

    let _guard = lock_writes();
    match with_board(|board| {
        board
            .add_scored_task(text, kind, &deriver)
            .map_err(board_message)
    }) {
        Ok(task) => TaskActionResponse::success("Task added.", Some(to_task_item(&task))),
        Err(message) => TaskActionResponse::failure(message),
    }
}

/// Edits title/kind/priority of a task. Unknown ids are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(
    id: String,
    title: Option<String>,
    kind: Option<String>,
    priority: Option<u8>,
) -> TaskActionResponse {
    let kind = match kind.as_deref().map(TaskType::parse) {
        Some(None) => {
            return TaskActionResponse::failure("task_update failed: unknown kind");
        }
        Some(parsed) => parsed,
        None => None,
    };
    let priority = match priority.map(Priority::new).transpose() {
        Ok(priority) => priority,
        Err(err) => return TaskActionResponse::failure(format!("task_update failed: {err}")),
    };
    let patch = TaskPatch {
        title,
        kind,
        priority,
    };

    let _guard = lock_writes();
    match with_board(|board| {
        board.update_task(&id, &patch).map_err(board_message)?;
        Ok(board.task(&id).map(to_task_item))
    }) {
        Ok(task) => TaskActionResponse::success("Task updated.", task),
        Err(err) => TaskActionResponse::failure(format!("task_update failed: {err}")),
    }
}

/// Removes one task. Unknown ids are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn task_remove(id: String) -> TaskActionResponse {
    let _guard = lock_writes();
    match with_board(|board| board.remove_task(&id).map_err(board_message)) {
        Ok(()) => TaskActionResponse::success("Task removed.", None),
        Err(err) => TaskActionResponse::failure(format!("task_remove failed: {err}")),
    }
}

/// Removes every task.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear() -> TaskActionResponse {
    let _guard = lock_writes();
    match with_board(|board| board.clear_all().map_err(board_message)) {
        Ok(()) => TaskActionResponse::success("All tasks removed.", None),
        Err(err) => TaskActionResponse::failure(format!("tasks_clear failed: {err}")),
    }
}

/// Work/play weights for the home screen.
#[flutter_rust_bridge::frb(sync)]
pub fn balance_summary() -> BalanceSummary {
    let balance = with_board(|board| Ok(board.balance())).unwrap_or_default();
    to_balance_summary(&balance)
}

/// Whether onboarding should be shown. Storage errors count as first launch.
#[flutter_rust_bridge::frb(sync)]
pub fn is_first_launch() -> bool {
    with_store(|store| is_first_launch_inner(store).map_err(|err| err.to_string())).unwrap_or(true)
}

/// Persists the onboarding-complete flag. Returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn mark_launched() -> String {
    let _guard = lock_writes();
    match with_store(|store| mark_launched_inner(store).map_err(|err| err.to_string())) {
        Ok(()) => String::new(),
        Err(err) => format!("mark_launched failed: {err}"),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TENBIN_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn lock_writes() -> std::sync::MutexGuard<'static, ()> {
    // the guarded value is `()`, so a poisoned lock carries no broken state
    WRITE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_store<T>(f: impl FnOnce(&SqliteKeyValueStore<'_>) -> Result<T, String>) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("storage open failed: {err}"))?;
    let store =
        SqliteKeyValueStore::try_new(&conn).map_err(|err| format!("storage init failed: {err}"))?;
    f(&store)
}

fn with_board<T>(
    f: impl FnOnce(&mut TaskBoard<&SqliteKeyValueStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_store(|store| {
        let mut board = TaskBoard::with_store(TaskStore::new(store));
        f(&mut board)
    })
}

fn board_message(err: BoardError) -> String {
    err.user_message()
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.clone(),
        title: task.title.clone(),
        kind: task.kind.as_str().to_string(),
        priority: task.priority.get(),
        created_at: format_timestamp(&task.created_at),
        updated_at: format_timestamp(&task.updated_at),
    }
}

fn to_balance_summary(balance: &Balance) -> BalanceSummary {
    BalanceSummary {
        work_sum: balance.work_sum,
        play_sum: balance.play_sum,
        work_count: balance.work_count,
        play_count: balance.play_count,
        work_ratio: balance.work_ratio(),
        play_ratio: balance.play_ratio(),
        tilt: match balance.tilt() {
            Tilt::Work => "work",
            Tilt::Play => "play",
            Tilt::Level => "level",
        }
        .to_string(),
    }
}
