//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate task store and scoring calls into screen-level use cases.
//! - Derive display aggregates from the current task snapshot.

pub mod balance;
pub mod board;
