//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted under the `tasks` key.
//! - Validate title/priority/timestamp invariants before persistence.
//! - Accept legacy field names written by earlier app builds.
//!
//! # Invariants
//! - `id` is non-empty and never reused for another task.
//! - `title` is stored trimmed and is never blank.
//! - `priority` is within `Priority::MIN..=Priority::MAX`.
//! - `updated_at` is never earlier than `created_at`.
//!
//! # See also
//! - docs/architecture/data-model.md

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
///
/// Kept as text: current builds write UUID v4 strings, older builds wrote
/// millisecond timestamps. Only uniqueness is required.
pub type TaskId = String;

/// Task category shown on either side of the balance scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Obligation-type task.
    #[serde(rename = "work", alias = "仕事")]
    Work,
    /// Leisure-type task.
    #[serde(rename = "play", alias = "遊び")]
    Play,
}

impl TaskType {
    /// Returns the canonical wire label (`work|play`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Play => "play",
        }
    }

    /// Parses a canonical or legacy category label.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "work" | "仕事" => Some(Self::Work),
            "play" | "遊び" => Some(Self::Play),
            _ => None,
        }
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for task invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// `id` is empty.
    EmptyId,
    /// `title` is empty after trimming.
    EmptyTitle,
    /// Stored record has no `priority` under any known name.
    MissingPriority,
    /// `priority` is outside the accepted range.
    PriorityOutOfRange { value: i64, min: u8, max: u8 },
    /// `updated_at` is earlier than `created_at`.
    TimestampsReversed,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::MissingPriority => write!(f, "task priority is missing"),
            Self::PriorityOutOfRange { value, min, max } => {
                write!(f, "priority {value} is outside {min}..={max}")
            }
            Self::TimestampsReversed => {
                write!(f, "updatedAt must be greater than or equal to createdAt")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Inclusive priority range accepted by one priority source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityScale {
    pub max: u8,
}

impl PriorityScale {
    /// Manual 1..=4 selector used by early builds.
    pub const MANUAL_LEGACY: Self = Self { max: 4 };
    /// Full 1..=10 range used by oracle scoring and the edit screen.
    pub const SCORED: Self = Self {
        max: Priority::MAX,
    };

    /// Returns whether `value` falls within `1..=max`.
    pub fn contains(self, value: i64) -> bool {
        value >= i64::from(Priority::MIN) && value <= i64::from(self.max)
    }

    /// Converts a raw integer into a priority on this scale.
    ///
    /// # Errors
    /// - `PriorityOutOfRange` when `value` is outside `1..=max`.
    pub fn priority(self, value: i64) -> Result<Priority, TaskValidationError> {
        if !self.contains(value) {
            return Err(TaskValidationError::PriorityOutOfRange {
                value,
                min: Priority::MIN,
                max: self.max,
            });
        }
        // in range, so the narrowing cannot truncate
        Ok(Priority(value as u8))
    }
}

/// Integer importance weight of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Creates a priority in `MIN..=MAX`.
    pub fn new(value: u8) -> Result<Self, TaskValidationError> {
        PriorityScale::SCORED.priority(i64::from(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Priority {
    type Error = TaskValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        PriorityScale::SCORED.priority(value)
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Serialized as `type` to match the stored schema.
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub priority: Priority,
    #[serde(serialize_with = "iso_millis::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "iso_millis::serialize")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task with a generated UUID and `created_at == updated_at == now`.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank after trimming.
    pub fn new(
        title: &str,
        kind: TaskType,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            kind,
            priority,
            created_at: now,
            updated_at: now,
        };
        task.validate()?;
        Ok(task)
    }

    /// Validates task invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::TimestampsReversed);
        }
        Ok(())
    }

    /// Applies recognized patch fields and refreshes `updated_at`.
    ///
    /// The task is left untouched when the patch fails validation.
    pub fn apply(&mut self, patch: &TaskPatch, now: DateTime<Utc>) -> Result<(), TaskValidationError> {
        let title = match patch.title.as_deref() {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(TaskValidationError::EmptyTitle);
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        // a skewed clock must not break `updated_at >= created_at`
        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}

/// Partial edit of a task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub kind: Option<TaskType>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.kind.is_none() && self.priority.is_none()
    }
}

/// Formats a timestamp the way tasks are stored (`2026-01-02T03:04:05.678Z`).
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Read-side shape that tolerates schema drift between app builds.
///
/// Older builds merged edits into records with an object spread, so one
/// record can carry both `text` and `title` (or `severity` and `priority`).
/// The current name wins; the older one is only a fallback.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "type")]
    kind: TaskType,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    severity: Option<Priority>,
    #[serde(deserialize_with = "iso_millis::deserialize")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "iso_millis::deserialize_option")]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let title = record
            .title
            .filter(|title| !title.trim().is_empty())
            .or(record.text)
            .ok_or(TaskValidationError::EmptyTitle)?;
        let priority = record
            .priority
            .or(record.severity)
            .ok_or(TaskValidationError::MissingPriority)?;

        let task = Self {
            id: record.id,
            title: title.trim().to_string(),
            kind: record.kind,
            priority,
            created_at: record.created_at,
            updated_at: record.updated_at.unwrap_or(record.created_at),
        };
        task.validate()?;
        Ok(task)
    }
}

/// RFC 3339 timestamps with millisecond precision and `Z` suffix.
///
/// Matches the format produced by JavaScript `Date#toISOString`, so old and
/// new records sort together lexicographically.
mod iso_millis {
    use super::*;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
                .map(|value| Some(value.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
