//! Domain model for the task board.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one stored task shape shared by list, edit and balance views.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard delete; there is no tombstone.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod task;
