//! Task list store: in-memory ordered list, durable slot mirror.
//!
//! # Responsibility
//! - Own the ordered in-memory task list for the session.
//! - Mirror the full serialized list to a durable slot after every
//!   mutation, before the mutation call returns.
//! - Notify an optional observer after applied mutations.
//!
//! # Invariants
//! - Task ids in the list are unique.
//! - Insertion order is preserved; edit/toggle never reorder.
//! - Persistence failures are logged and never roll back the in-memory
//!   mutation; the in-memory list stays the session source of truth.
//! - A missing or unreadable persisted payload hydrates like a first run.

use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::repo::slot_repo::SlotRepository;
use log::{error, info};

/// Fixed slot key holding the serialized task list.
pub const TASKS_SLOT_KEY: &str = "tasks";

/// Notification emitted after a mutation has been applied and its persist
/// attempt finished. Purely presentational concerns (add animation and the
/// like) hang off these instead of store state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskListEvent {
    TaskAdded(TaskId),
    TaskRemoved(TaskId),
    TextEdited(TaskId),
    CompletionToggled(TaskId),
}

/// Observer contract for UI shells reacting to store mutations.
pub trait TaskListObserver {
    fn on_event(&mut self, event: TaskListEvent);
}

/// Single-list task store with write-through persistence.
///
/// Generic over [`SlotRepository`] so tests can substitute in-memory or
/// failing backends for the SQLite slot.
pub struct TaskListStore<R: SlotRepository> {
    tasks: Vec<Task>,
    slot: R,
    observer: Option<Box<dyn TaskListObserver>>,
}

impl<R: SlotRepository> TaskListStore<R> {
    /// Creates an empty store over the given slot backend.
    pub fn new(slot: R) -> Self {
        Self {
            tasks: Vec::new(),
            slot,
            observer: None,
        }
    }

    /// Registers the observer receiving mutation events.
    pub fn set_observer(&mut self, observer: Box<dyn TaskListObserver>) {
        self.observer = Some(observer);
    }

    /// Current in-memory snapshot, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Hydrates the list from the durable slot.
    ///
    /// A present payload replaces the current contents; an absent one
    /// leaves them untouched. Read failures and corrupt payloads are
    /// logged and otherwise treated as absent: a session that cannot read
    /// its history still starts.
    pub fn load(&mut self) {
        match self.slot.get(TASKS_SLOT_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<Task>>(&payload) {
                Ok(tasks) => {
                    info!(
                        "event=tasks_load module=store status=ok count={}",
                        tasks.len()
                    );
                    self.tasks = tasks;
                }
                Err(err) => {
                    error!(
                        "event=tasks_load module=store status=error error_code=corrupt_payload error={err}"
                    );
                }
            },
            Ok(None) => {
                info!("event=tasks_load module=store status=ok count=0 source=empty");
            }
            Err(err) => {
                error!(
                    "event=tasks_load module=store status=error error_code=slot_read_failed error={err}"
                );
            }
        }
    }

    /// Appends a new task built from `raw_text`.
    ///
    /// # Contract
    /// - Text is trimmed; an empty trim result is rejected with
    ///   [`TaskValidationError::EmptyText`] and nothing is mutated or
    ///   persisted.
    /// - The new task gets a fresh unique id and `completed = false`.
    /// - Returns a clone of the appended task.
    pub fn add(&mut self, raw_text: &str) -> Result<Task, TaskValidationError> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::EmptyText);
        }

        let task = Task::new(trimmed);
        self.tasks.push(task.clone());
        self.persist("task_add");
        self.notify(TaskListEvent::TaskAdded(task.id));
        Ok(task)
    }

    /// Removes the task with `id`, if present.
    ///
    /// A missing id is a no-op, not an error. The slot is rewritten either
    /// way, matching the idempotent delete contract.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;

        self.persist("task_delete");
        if removed {
            self.notify(TaskListEvent::TaskRemoved(id));
        }
        removed
    }

    /// Replaces the text of the task with `id`, if present.
    ///
    /// Unlike `add`, the replacement is applied unconditionally: no trim,
    /// no empty check. Observed legacy behavior, kept as-is.
    pub fn edit_text(&mut self, id: TaskId, new_text: impl Into<String>) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };

        task.text = new_text.into();
        self.persist("task_edit");
        self.notify(TaskListEvent::TextEdited(id));
        true
    }

    /// Flips the completion flag of the task with `id`, if present.
    pub fn toggle_completed(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };

        task.toggle();
        self.persist("task_toggle");
        self.notify(TaskListEvent::CompletionToggled(id));
        true
    }

    /// Writes the full serialized list to the durable slot.
    ///
    /// Failures are logged with metadata only (never task text) and do not
    /// propagate: the in-memory list remains authoritative for the session.
    fn persist(&self, op: &str) {
        let payload = match serde_json::to_string(&self.tasks) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "event=tasks_persist module=store status=error op={op} error_code=serialize_failed error={err}"
                );
                return;
            }
        };

        match self.slot.set(TASKS_SLOT_KEY, &payload) {
            Ok(()) => {
                info!(
                    "event=tasks_persist module=store status=ok op={op} count={}",
                    self.tasks.len()
                );
            }
            Err(err) => {
                error!(
                    "event=tasks_persist module=store status=error op={op} error_code=slot_write_failed error={err}"
                );
            }
        }
    }

    fn notify(&mut self, event: TaskListEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(event);
        }
    }
}
