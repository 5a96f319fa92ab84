//! Task definitions — the data model for deferred deliveries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of deferred work: one message waiting for its delivery time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID, also the correlation field sent to the destination.
    pub id: String,
    /// Caller-supplied message, forwarded verbatim inside the envelope.
    pub content: String,
    /// Caller-supplied appointment time (offset mode only).
    pub requested_time: Option<DateTime<Utc>>,
    /// Absolute instant at which delivery is attempted. Fixed at creation.
    pub fire_time: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current status.
    pub status: TaskStatus,
    /// Append-only attempt history, insertion order = chronological order.
    pub history: Vec<AttemptRecord>,
}

/// Task status. `Scheduled` is the only non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Scheduled,
    Delivered,
    Failed,
}

impl TaskStatus {
    /// Whether the task has reached a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Scheduled)
    }
}

/// One entry in a task's history: the outcome of one lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub outcome: AttemptOutcome,
    /// HTTP status returned by the destination, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Destination response body, or an error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Scheduled,
    Success,
    Error,
}

impl AttemptRecord {
    /// Record seeded into the history when a task is accepted.
    pub fn scheduled() -> Self {
        Self {
            timestamp: Utc::now(),
            outcome: AttemptOutcome::Scheduled,
            http_status: None,
            detail: None,
        }
    }

    /// Record for a delivery the destination acknowledged with 2xx.
    pub fn success(http_status: u16, body: String) -> Self {
        Self {
            timestamp: Utc::now(),
            outcome: AttemptOutcome::Success,
            http_status: Some(http_status),
            detail: Some(body),
        }
    }

    /// Record for a failed delivery (non-2xx or transport error).
    pub fn error(description: String) -> Self {
        Self {
            timestamp: Utc::now(),
            outcome: AttemptOutcome::Error,
            http_status: None,
            detail: Some(description),
        }
    }
}

impl Task {
    /// Create a new scheduled task. The history starts with one
    /// `scheduled` record; every later transition appends exactly one more.
    pub fn new(
        content: String,
        requested_time: Option<DateTime<Utc>>,
        fire_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            requested_time,
            fire_time,
            created_at: Utc::now(),
            status: TaskStatus::Scheduled,
            history: vec![AttemptRecord::scheduled()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_scheduled_with_seed_record() {
        let fire = Utc::now() + chrono::Duration::seconds(30);
        let task = Task::new("hello".into(), None, fire);
        assert_eq!(task.status, TaskStatus::Scheduled);
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].outcome, AttemptOutcome::Scheduled);
        assert_eq!(task.fire_time, fire);
    }

    #[test]
    fn test_ids_are_unique() {
        let fire = Utc::now();
        let a = Task::new("a".into(), None, fire);
        let b = Task::new("b".into(), None, fire);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(TaskStatus::Scheduled).unwrap();
        assert_eq!(json, "scheduled");
        let json = serde_json::to_value(AttemptOutcome::Error).unwrap();
        assert_eq!(json, "error");
    }
}
