//! In-memory task store — the only shared mutable state in the relay.
//!
//! One instance is created at startup and handed to both the gateway
//! handlers and the dispatch workers. Tasks are retained for the life of
//! the process; there is no eviction and no persistence across restarts.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::task::{AttemptRecord, Task, TaskStatus};

/// Registry mapping task id → task state + attempt history.
///
/// A single lock guards the whole map. Volume is low (one entry per
/// schedule request) and every critical section is a map operation, so
/// per-id sharding would buy nothing.
#[derive(Default)]
pub struct TaskStore {
    tasks: Mutex<HashMap<String, Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new scheduled task and return its id.
    pub fn create(
        &self,
        content: String,
        requested_time: Option<DateTime<Utc>>,
        fire_time: DateTime<Utc>,
    ) -> String {
        let task = Task::new(content, requested_time, fire_time);
        let id = task.id.clone();
        self.tasks.lock().unwrap().insert(id.clone(), task);
        id
    }

    /// Look up a task by id. `None` for unknown ids — the gateway maps
    /// that to 404.
    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.lock().unwrap().get(id).cloned()
    }

    /// Snapshot of all tasks.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().values().cloned().collect()
    }

    /// Append the delivery outcome and set the terminal status as one
    /// atomic unit. Returns `false` without touching the task if it is
    /// unknown or already terminal, so an erroneous double fire can never
    /// record a second outcome.
    pub fn complete(&self, id: &str, record: AttemptRecord, status: TaskStatus) -> bool {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.get_mut(id) else {
            return false;
        };
        if task.status.is_terminal() {
            return false;
        }
        task.history.push(record);
        task.status = status;
        true
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::AttemptOutcome;

    fn fire_time() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(30)
    }

    #[test]
    fn test_create_and_get() {
        let store = TaskStore::new();
        let id = store.create("hello".into(), None, fire_time());
        let task = store.get(&id).unwrap();
        assert_eq!(task.content, "hello");
        assert_eq!(task.status, TaskStatus::Scheduled);
        assert_eq!(task.history.len(), 1);
    }

    #[test]
    fn test_get_unknown_is_none() {
        let store = TaskStore::new();
        assert!(store.get("no-such-task").is_none());
    }

    #[test]
    fn test_list_counts_every_create() {
        let store = TaskStore::new();
        assert!(store.is_empty());
        for i in 0..5 {
            store.create(format!("msg-{i}"), None, fire_time());
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.list().len(), 5);
    }

    #[test]
    fn test_complete_appends_and_transitions() {
        let store = TaskStore::new();
        let id = store.create("hello".into(), None, fire_time());

        let done = store.complete(
            &id,
            AttemptRecord::success(200, "ok".into()),
            TaskStatus::Delivered,
        );
        assert!(done);

        let task = store.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Delivered);
        assert_eq!(task.history.len(), 2);
        assert_eq!(task.history[1].outcome, AttemptOutcome::Success);
        assert_eq!(task.history[1].http_status, Some(200));
    }

    #[test]
    fn test_complete_is_idempotent_after_terminal() {
        let store = TaskStore::new();
        let id = store.create("hello".into(), None, fire_time());

        assert!(store.complete(
            &id,
            AttemptRecord::error("destination unreachable".into()),
            TaskStatus::Failed,
        ));
        // Second fire must be a no-op
        assert!(!store.complete(
            &id,
            AttemptRecord::success(200, "ok".into()),
            TaskStatus::Delivered,
        ));

        let task = store.get(&id).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.history.len(), 2);
    }

    #[test]
    fn test_complete_unknown_is_noop() {
        let store = TaskStore::new();
        assert!(!store.complete(
            "no-such-task",
            AttemptRecord::error("x".into()),
            TaskStatus::Failed,
        ));
    }
}
