//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the canonical task record used by store and persistence code.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - The whole list is the unit of persistence, never a single record.

pub mod task;
