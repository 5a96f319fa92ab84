//! Dispatch worker — the body of a fired timer.
//!
//! Re-reads the task, delivers the envelope, and records exactly one
//! terminal outcome. Failures are logged and recorded, never escalated:
//! the schedule request was already answered, so `/status` and the logs
//! are the only place an operator sees them.

use std::sync::Arc;

use crate::deliver::{Envelope, WebhookClient};
use crate::store::TaskStore;
use crate::task::{AttemptRecord, TaskStatus};

/// Deliver one scheduled task and record the outcome.
///
/// The timer primitive is one-shot, so this normally runs once per task.
/// If it is ever invoked again for a task already in a terminal state, the
/// store's `complete` guard keeps it a no-op.
pub async fn dispatch(store: Arc<TaskStore>, client: Arc<WebhookClient>, task_id: String) {
    let Some(task) = store.get(&task_id) else {
        tracing::warn!("🕳️ Dispatch fired for unknown task {task_id}");
        return;
    };
    if task.status.is_terminal() {
        tracing::warn!(
            "⏭️ Task {task_id} already {:?} — skipping duplicate fire",
            task.status
        );
        return;
    }

    let envelope = Envelope::delivery(&task.id, &task.content);
    match client.deliver(&envelope).await {
        Ok(resp) => {
            tracing::info!("✅ Task {task_id} delivered ({})", resp.status);
            store.complete(
                &task_id,
                AttemptRecord::success(resp.status, resp.body),
                TaskStatus::Delivered,
            );
        }
        Err(e) => {
            tracing::warn!("⚠️ Task {task_id} delivery failed: {e}");
            store.complete(&task_id, AttemptRecord::error(e), TaskStatus::Failed);
        }
    }
}
