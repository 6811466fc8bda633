//! Task store over key-value storage.
//!
//! # Responsibility
//! - Own the canonical task collection persisted under `TASKS_KEY`.
//! - Provide create/read/update/delete/clear APIs for UI callers.
//!
//! # Invariants
//! - The collection is stored as one JSON array, newest task first.
//! - Every mutation reads the whole collection, applies the change in
//!   memory and writes the whole collection back.
//! - Mutations never overwrite a blob that failed to parse; only
//!   `clear_all_tasks` replaces it.
//! - Log events carry ids and counts, never task titles.

use crate::clock::{Clock, SystemClock};
use crate::model::task::{Priority, Task, TaskPatch, TaskType, TaskValidationError};
use crate::repo::kv_store::{KeyValueStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Task store error.
#[derive(Debug)]
pub enum RepoError {
    /// Input violated a task invariant; nothing was persisted.
    Validation(TaskValidationError),
    /// Underlying storage read or write failed.
    Store(StoreError),
    /// Stored collection exists but cannot be decoded.
    CorruptData(String),
    /// Collection could not be encoded for writing.
    Serialize(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::CorruptData(message) => write!(f, "stored task data is corrupt: {message}"),
            Self::Serialize(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::CorruptData(_) => None,
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Durable CRUD over the task collection.
pub struct TaskStore<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TaskStore<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Returns the full collection, newest first.
    ///
    /// Falls back to an empty list when nothing is stored, when the stored
    /// blob cannot be decoded, or when the read itself fails. Callers that
    /// need to tell those apart use [`TaskStore::read_tasks`].
    pub fn list_tasks(&self) -> Vec<Task> {
        match self.read_tasks() {
            Ok(tasks) => tasks,
            Err(RepoError::CorruptData(message)) => {
                warn!(
                    "event=tasks_read module=repo status=fallback reason=corrupt detail={message}"
                );
                Vec::new()
            }
            Err(err) => {
                warn!("event=tasks_read module=repo status=fallback reason=read_failed error={err}");
                Vec::new()
            }
        }
    }

    /// Strict read of the full collection.
    ///
    /// # Errors
    /// - `Store` when storage cannot be read.
    /// - `CorruptData` when a stored blob exists but does not decode into
    ///   valid tasks.
    pub fn read_tasks(&self) -> RepoResult<Vec<Task>> {
        let Some(raw) = self.store.get_item(TASKS_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str::<Vec<Task>>(&raw).map_err(|err| RepoError::CorruptData(err.to_string()))
    }

    /// Looks up one task by id.
    pub fn get_task(&self, id: &str) -> RepoResult<Option<Task>> {
        Ok(self.read_tasks()?.into_iter().find(|task| task.id == id))
    }

    /// Creates a task and prepends it to the collection.
    ///
    /// # Errors
    /// - `Validation(EmptyTitle)` when `text` is blank; storage is not touched.
    /// - `CorruptData`/`Store`/`Serialize` when the collection cannot be
    ///   read or written back.
    pub fn add_task(&self, text: &str, kind: TaskType, priority: Priority) -> RepoResult<Task> {
        let task = Task::new(text, kind, priority, self.clock.now())?;

        let mut tasks = self.read_tasks()?;
        tasks.insert(0, task.clone());
        self.write_tasks(&tasks)?;

        info!(
            "event=task_add module=repo status=ok task_id={} kind={} priority={} count={}",
            task.id,
            task.kind,
            task.priority,
            tasks.len()
        );
        Ok(task)
    }

    /// Applies `patch` to the task with `id` and refreshes its `updated_at`.
    ///
    /// An unknown `id` is a no-op, so an edit racing a delete does not fail.
    pub fn update_task(&self, id: &str, patch: &TaskPatch) -> RepoResult<()> {
        let mut tasks = self.read_tasks()?;
        let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
            info!("event=task_update module=repo status=skipped reason=not_found task_id={id}");
            return Ok(());
        };

        task.apply(patch, self.clock.now())?;
        self.write_tasks(&tasks)?;

        info!("event=task_update module=repo status=ok task_id={id}");
        Ok(())
    }

    /// Removes the task with `id` when present.
    pub fn remove_task(&self, id: &str) -> RepoResult<()> {
        let mut tasks = self.read_tasks()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let removed = before - tasks.len();
        self.write_tasks(&tasks)?;

        info!(
            "event=task_remove module=repo status=ok task_id={id} removed={removed} count={}",
            tasks.len()
        );
        Ok(())
    }

    /// Replaces the collection with an empty one.
    ///
    /// Also the recovery path for a corrupt blob.
    pub fn clear_all_tasks(&self) -> RepoResult<()> {
        self.write_tasks(&[])?;
        info!("event=task_clear module=repo status=ok");
        Ok(())
    }

    fn write_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        let encoded = serde_json::to_string(tasks).map_err(RepoError::Serialize)?;
        self.store.set_item(TASKS_KEY, &encoded).map_err(|err| {
            error!(
                "event=tasks_write module=repo status=error error_code=store_write_failed error={err}"
            );
            RepoError::Store(err)
        })
    }
}
