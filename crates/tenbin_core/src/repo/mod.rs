//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract the app persists into.
//! - Keep task collection encoding out of service/UI orchestration.
//!
//! # Invariants
//! - Task writes must enforce `Task::validate()` before persistence.
//! - Storage write failures are returned to callers, never swallowed.

pub mod kv_store;
pub mod launch_flag;
pub mod task_repo;
