//! Core domain logic for Tenbin.
//! This crate is the single source of truth for task invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod service;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, ScoringConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    Priority, PriorityScale, Task, TaskId, TaskPatch, TaskType, TaskValidationError,
};
pub use repo::kv_store::{KeyValueStore, SqliteKeyValueStore, StoreError, StoreResult};
pub use repo::launch_flag::{is_first_launch, mark_launched};
pub use repo::task_repo::{RepoError, RepoResult, TaskStore, TASKS_KEY};
pub use scoring::{
    GeminiOracle, OracleError, PriorityDeriver, ScoringError, ScoringOracle,
    SCORING_FAILED_MESSAGE,
};
pub use service::balance::{Balance, Tilt};
pub use service::board::{BoardError, BoardResult, TaskBoard};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
