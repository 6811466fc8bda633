//! Application-level task board state.
//!
//! # Responsibility
//! - Hold the one in-memory snapshot of tasks that screens render from.
//! - Route every mutation through `TaskStore` and re-read afterwards.
//! - Gate oracle-scored creation so a task is either scored and stored,
//!   or not stored at all.
//!
//! # Invariants
//! - The snapshot is only ever replaced by a store read, never edited in place.
//! - A scoring failure aborts before any storage write.

use crate::clock::{Clock, SystemClock};
use crate::model::task::{Priority, Task, TaskPatch, TaskType, TaskValidationError};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::task_repo::{RepoError, TaskStore};
use crate::scoring::{PriorityDeriver, ScoringError, ScoringOracle};
use crate::service::balance::Balance;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Board-level failure surfaced to the screen layer.
#[derive(Debug)]
pub enum BoardError {
    Validation(TaskValidationError),
    Scoring(ScoringError),
    Repo(RepoError),
}

impl BoardError {
    /// Message suitable for an alert dialog.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Scoring(err) => err.user_message().to_string(),
            Self::Repo(err) => err.to_string(),
        }
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Scoring(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Scoring(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for BoardError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ScoringError> for BoardError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;

/// Task store plus the snapshot screens render from.
pub struct TaskBoard<S: KeyValueStore, C: Clock = SystemClock> {
    store: TaskStore<S, C>,
    tasks: Vec<Task>,
}

impl<S: KeyValueStore> TaskBoard<S> {
    /// Builds a board and loads the initial snapshot.
    pub fn load(store: S) -> Self {
        Self::with_store(TaskStore::new(store))
    }
}

impl<S: KeyValueStore, C: Clock> TaskBoard<S, C> {
    pub fn with_store(store: TaskStore<S, C>) -> Self {
        let tasks = store.list_tasks();
        Self { store, tasks }
    }

    /// Current snapshot, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn balance(&self) -> Balance {
        Balance::from_tasks(&self.tasks)
    }

    /// Re-reads the snapshot after a mutation made outside this board.
    pub fn refresh(&mut self) {
        self.tasks = self.store.list_tasks();
    }

    /// Adds a task with a manually chosen priority.
    pub fn add_task(&mut self, text: &str, kind: TaskType, priority: Priority) -> BoardResult<Task> {
        let result = self.store.add_task(text, kind, priority);
        self.refresh();
        Ok(result?)
    }

    /// Scores `text` through the oracle, then adds the task.
    ///
    /// Blank text fails before the oracle is called. Any scoring failure
    /// aborts without writing.
    pub fn add_scored_task<O: ScoringOracle>(
        &mut self,
        text: &str,
        kind: TaskType,
        deriver: &PriorityDeriver<O>,
    ) -> BoardResult<Task> {
        if text.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle.into());
        }
        let priority = deriver.derive_priority(text, kind)?;
        self.add_task(text, kind, priority)
    }

    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> BoardResult<()> {
        let result = self.store.update_task(id, patch);
        self.refresh();
        Ok(result?)
    }

    pub fn remove_task(&mut self, id: &str) -> BoardResult<()> {
        let result = self.store.remove_task(id);
        self.refresh();
        Ok(result?)
    }

    pub fn clear_all(&mut self) -> BoardResult<()> {
        let result = self.store.clear_all_tasks();
        self.refresh();
        Ok(result?)
    }

    pub fn store(&self) -> &TaskStore<S, C> {
        &self.store
    }
}
