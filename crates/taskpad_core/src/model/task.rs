//! Task domain model.
//!
//! # Responsibility
//! - Define the single record type of the task list.
//! - Keep the wire shape stable: `id` (uuid string), `text`, `completed`.
//!
//! # Invariants
//! - `id` is assigned at creation and never reused for another task.
//! - `completed` starts as `false` for every new task.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Rejection raised by the add path when input text is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Input text was empty after trimming surrounding whitespace.
    EmptyText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text is empty after trimming"),
        }
    }
}

impl Error for TaskValidationError {}

/// A single to-do entry.
///
/// Edits mutate `text` in place; completion is a two-state flag toggled by
/// the user. Identity never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID, serialized as a uuid string.
    pub id: TaskId,
    /// User-supplied task text.
    pub text: String,
    /// Completion flag, flipped by `toggle`.
    pub completed: bool,
}

impl Task {
    /// Creates a task with a generated stable ID and `completed = false`.
    ///
    /// Text validation is the add path's concern, not the constructor's:
    /// edits may later store arbitrary text through the same shape.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), text)
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by tests and hydration paths where identity already exists.
    pub fn with_id(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}
