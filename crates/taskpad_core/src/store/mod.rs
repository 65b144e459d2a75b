//! Core use-case store.
//!
//! # Responsibility
//! - Orchestrate task-list mutations over the slot repository.
//! - Keep UI shells decoupled from storage details.

pub mod task_list_store;
