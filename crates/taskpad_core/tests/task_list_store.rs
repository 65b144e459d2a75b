use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use taskpad_core::db::open_db_in_memory;
use taskpad_core::{
    SlotError, SlotRepository, SlotResult, SqliteSlotRepository, Task, TaskListEvent,
    TaskListObserver, TaskListStore, TaskValidationError, TASKS_SLOT_KEY,
};
use uuid::Uuid;

/// In-memory slot backend with a shared handle for inspection.
#[derive(Clone, Default)]
struct MemorySlot {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl SlotRepository for MemorySlot {
    fn get(&self, key: &str) -> SlotResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Slot backend whose every operation fails.
struct FailingSlot;

impl SlotRepository for FailingSlot {
    fn get(&self, _key: &str) -> SlotResult<Option<String>> {
        Err(SlotError::MissingRequiredTable("slots"))
    }

    fn set(&self, _key: &str, _value: &str) -> SlotResult<()> {
        Err(SlotError::MissingRequiredTable("slots"))
    }
}

struct RecordingObserver {
    events: Rc<RefCell<Vec<TaskListEvent>>>,
}

impl TaskListObserver for RecordingObserver {
    fn on_event(&mut self, event: TaskListEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[test]
fn add_appends_trimmed_task_with_defaults() {
    let mut store = TaskListStore::new(MemorySlot::default());

    let task = store.add("  Buy milk  ").unwrap();

    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0], task);
    assert_eq!(task.text, "Buy milk");
    assert!(!task.completed);
}

#[test]
fn added_tasks_get_unique_ids_and_keep_insertion_order() {
    let mut store = TaskListStore::new(MemorySlot::default());

    let first = store.add("first").unwrap();
    let second = store.add("second").unwrap();
    let third = store.add("third").unwrap();

    assert_ne!(first.id, second.id);
    assert_ne!(second.id, third.id);
    let texts: Vec<&str> = store.tasks().iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
}

#[test]
fn blank_add_is_rejected_without_mutation_or_persist() {
    let slot = MemorySlot::default();
    let mut store = TaskListStore::new(slot.clone());

    assert_eq!(store.add(""), Err(TaskValidationError::EmptyText));
    assert_eq!(store.add("   "), Err(TaskValidationError::EmptyText));

    assert!(store.tasks().is_empty());
    assert!(slot.values.borrow().is_empty());
}

#[test]
fn add_writes_the_full_list_before_returning() {
    let slot = MemorySlot::default();
    let mut store = TaskListStore::new(slot.clone());

    let task = store.add("Buy milk").unwrap();

    let payload = slot.values.borrow().get(TASKS_SLOT_KEY).cloned().unwrap();
    let persisted: Vec<Task> = serde_json::from_str(&payload).unwrap();
    assert_eq!(persisted, vec![task]);
}

#[test]
fn delete_removes_matching_task() {
    let mut store = TaskListStore::new(MemorySlot::default());
    let keep = store.add("keep").unwrap();
    let gone = store.add("gone").unwrap();

    assert!(store.delete(gone.id));

    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id, keep.id);
}

#[test]
fn delete_of_absent_id_is_a_noop_but_still_persists() {
    let slot = MemorySlot::default();
    let mut store = TaskListStore::new(slot.clone());
    let task = store.add("survivor").unwrap();

    // Clobber the slot so the idempotent rewrite is observable.
    slot.set(TASKS_SLOT_KEY, "[]").unwrap();

    let before: Vec<Task> = store.tasks().to_vec();
    assert!(!store.delete(Uuid::new_v4()));
    assert_eq!(store.tasks(), before.as_slice());

    let payload = slot.values.borrow().get(TASKS_SLOT_KEY).cloned().unwrap();
    let persisted: Vec<Task> = serde_json::from_str(&payload).unwrap();
    assert_eq!(persisted, vec![task]);
}

#[test]
fn toggle_flips_once_and_restores_when_applied_twice() {
    let mut store = TaskListStore::new(MemorySlot::default());
    let task = store.add("flip me").unwrap();

    assert!(store.toggle_completed(task.id));
    assert!(store.tasks()[0].completed);

    assert!(store.toggle_completed(task.id));
    assert!(!store.tasks()[0].completed);
}

#[test]
fn toggle_of_absent_id_is_a_noop() {
    let mut store = TaskListStore::new(MemorySlot::default());
    store.add("unrelated").unwrap();

    assert!(!store.toggle_completed(Uuid::new_v4()));
    assert!(!store.tasks()[0].completed);
}

#[test]
fn edit_text_applies_replacement_unconditionally() {
    let mut store = TaskListStore::new(MemorySlot::default());
    let task = store.add("original").unwrap();
    store.toggle_completed(task.id);

    // The edit path carries no trim or empty check; whatever the caller
    // hands over is stored verbatim.
    assert!(store.edit_text(task.id, ""));
    assert_eq!(store.tasks()[0].text, "");
    assert!(store.tasks()[0].completed);

    assert!(store.edit_text(task.id, "  padded  "));
    assert_eq!(store.tasks()[0].text, "  padded  ");
}

#[test]
fn edit_text_of_absent_id_is_a_noop() {
    let mut store = TaskListStore::new(MemorySlot::default());
    store.add("stays").unwrap();

    assert!(!store.edit_text(Uuid::new_v4(), "never lands"));
    assert_eq!(store.tasks()[0].text, "stays");
}

#[test]
fn buy_milk_scenario_runs_end_to_end() {
    let mut store = TaskListStore::new(MemorySlot::default());
    assert!(store.tasks().is_empty());

    let task = store.add("Buy milk").unwrap();
    assert_eq!(store.tasks()[0].text, "Buy milk");
    assert!(!store.tasks()[0].completed);

    store.toggle_completed(task.id);
    assert!(store.tasks()[0].completed);

    store.edit_text(task.id, "Buy oat milk");
    assert_eq!(store.tasks()[0].text, "Buy oat milk");
    assert!(store.tasks()[0].completed);

    store.delete(task.id);
    assert!(store.tasks().is_empty());
}

#[test]
fn load_hydrates_from_a_prior_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskpad.db");

    let conn = taskpad_core::db::open_db(&path).unwrap();
    let mut store = TaskListStore::new(SqliteSlotRepository::try_new(&conn).unwrap());
    let first = store.add("carried over").unwrap();
    let second = store.add("also carried").unwrap();
    store.toggle_completed(second.id);
    drop(store);
    drop(conn);

    let conn = taskpad_core::db::open_db(&path).unwrap();
    let mut store = TaskListStore::new(SqliteSlotRepository::try_new(&conn).unwrap());
    store.load();

    assert_eq!(store.tasks().len(), 2);
    assert_eq!(store.tasks()[0].id, first.id);
    assert_eq!(store.tasks()[0].text, "carried over");
    assert!(!store.tasks()[0].completed);
    assert_eq!(store.tasks()[1].id, second.id);
    assert!(store.tasks()[1].completed);
}

#[test]
fn load_replaces_current_contents_when_payload_is_present() {
    let slot = MemorySlot::default();
    let mut store = TaskListStore::new(slot.clone());
    store.add("pre-load leftover").unwrap();

    let persisted = vec![Task::new("from disk")];
    slot.set(TASKS_SLOT_KEY, &serde_json::to_string(&persisted).unwrap())
        .unwrap();
    store.load();

    assert_eq!(store.tasks(), persisted.as_slice());
}

#[test]
fn load_with_no_persisted_data_keeps_current_list() {
    let conn = open_db_in_memory().unwrap();
    let mut store = TaskListStore::new(SqliteSlotRepository::try_new(&conn).unwrap());

    store.load();
    assert!(store.tasks().is_empty());
}

#[test]
fn load_treats_corrupt_payload_as_no_data() {
    let conn = open_db_in_memory().unwrap();
    let view = SqliteSlotRepository::try_new(&conn).unwrap();
    view.set(TASKS_SLOT_KEY, "definitely not json").unwrap();

    let mut store = TaskListStore::new(SqliteSlotRepository::try_new(&conn).unwrap());
    store.load();

    assert!(store.tasks().is_empty());
}

#[test]
fn load_survives_a_failing_backend() {
    let mut store = TaskListStore::new(FailingSlot);

    store.load();
    assert!(store.tasks().is_empty());
}

#[test]
fn write_failure_keeps_the_in_memory_mutation() {
    let mut store = TaskListStore::new(FailingSlot);

    let task = store.add("still here").unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id, task.id);

    assert!(store.toggle_completed(task.id));
    assert!(store.tasks()[0].completed);

    assert!(store.delete(task.id));
    assert!(store.tasks().is_empty());
}

#[test]
fn observer_receives_events_for_applied_mutations_only() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut store = TaskListStore::new(MemorySlot::default());
    store.set_observer(Box::new(RecordingObserver {
        events: Rc::clone(&events),
    }));

    assert!(store.add("  ").is_err());
    let task = store.add("watched").unwrap();
    store.toggle_completed(task.id);
    store.edit_text(task.id, "watched closely");
    store.delete(Uuid::new_v4());
    store.delete(task.id);

    assert_eq!(
        events.borrow().as_slice(),
        [
            TaskListEvent::TaskAdded(task.id),
            TaskListEvent::CompletionToggled(task.id),
            TaskListEvent::TextEdited(task.id),
            TaskListEvent::TaskRemoved(task.id),
        ]
    );
}
