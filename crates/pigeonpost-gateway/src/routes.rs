//! API route handlers for the gateway.
//!
//! Request bodies are read as raw strings and parsed with `serde_json` so
//! that malformed input gets the service's own 400 shape. Exactly one wire
//! format is accepted: a plain JSON object body. Code fences, escaped
//! newlines and other upstream mangling are rejected, not repaired.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde_json::json;

use super::server::AppState;
use pigeonpost_relay::{Envelope, Task, dispatch, schedule_once};

/// Liveness probe.
pub async fn home(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "message": "PigeonPost relay is running",
        "time": Utc::now().to_rfc3339(),
        "env": state.gateway_config.environment,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Test the destination connection with a fixed envelope (GET).
pub async fn test_webhook(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    send_test(&state, "Hello from PigeonPost!").await
}

/// Test the destination connection with a caller-supplied message (POST).
/// An empty body falls back to the fixed test message.
pub async fn test_webhook_with_body(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let message = if body.trim().is_empty() {
        "Hello from PigeonPost!".to_string()
    } else {
        let payload: serde_json::Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "status": "error",
                        "message": format!("Invalid JSON body: {e}"),
                    })),
                );
            }
        };
        payload["message"]
            .as_str()
            .unwrap_or("Hello from PigeonPost!")
            .to_string()
    };
    send_test(&state, &message).await
}

async fn send_test(state: &AppState, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    match state.webhook.deliver(&Envelope::test(message)).await {
        Ok(resp) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "response": resp.body,
                "code": resp.status,
            })),
        ),
        Err(e) => {
            tracing::warn!("⚠️ Test webhook failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": e,
                })),
            )
        }
    }
}

/// Accept a message for deferred delivery.
///
/// Required field: `formatted_message`. In offset mode the caller must also
/// supply `appointment_time` (RFC 3339, trailing `Z` accepted as UTC). The
/// task is created and its one-shot timer armed before the response is sent.
pub async fn schedule(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let payload: serde_json::Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "message": format!("Invalid JSON body: {e}"),
                })),
            );
        }
    };

    let Some(content) = payload["formatted_message"].as_str() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": "Missing required fields: formatted_message",
            })),
        );
    };

    let requested_time = if state.strategy.requires_appointment_time() {
        let Some(raw) = payload["appointment_time"].as_str() else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "message": "Missing required fields: appointment_time",
                })),
            );
        };
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "status": "error",
                        "message": format!(
                            "Invalid appointment_time '{raw}': {e} (expected RFC 3339, e.g. 2024-01-01T10:00:00Z)"
                        ),
                    })),
                );
            }
        }
    } else {
        None
    };

    let fire_time = match state.strategy.fire_time(Utc::now(), requested_time) {
        Ok(t) => t,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "message": e})),
            );
        }
    };

    let task_id = state
        .store
        .create(content.to_string(), requested_time, fire_time);
    schedule_once(
        fire_time,
        dispatch(state.store.clone(), state.webhook.clone(), task_id.clone()),
    );
    tracing::info!("📅 Task {task_id} scheduled to fire at {}", fire_time.to_rfc3339());

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "task_id": task_id,
            "details": {
                "mode": state.strategy.mode_name(),
                "fire_time": fire_time.to_rfc3339(),
                "requested_time": requested_time.map(|t| t.to_rfc3339()),
            },
        })),
    )
}

/// Report one task (`?task_id=...`) or all tasks.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<serde_json::Value>) {
    if let Some(task_id) = params.get("task_id") {
        return match state.store.get(task_id) {
            Some(task) => (StatusCode::OK, Json(task_json(&task))),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "status": "error",
                    "message": format!("Unknown task_id '{task_id}'"),
                })),
            ),
        };
    }

    let tasks: serde_json::Map<String, serde_json::Value> = state
        .store
        .list()
        .iter()
        .map(|t| (t.id.clone(), task_json(t)))
        .collect();
    (
        StatusCode::OK,
        Json(json!({"tasks": tasks, "count": tasks.len()})),
    )
}

fn task_json(task: &Task) -> serde_json::Value {
    json!({
        "task_id": task.id,
        "status": task.status,
        "details": {
            "content": task.content,
            "requested_time": task.requested_time.map(|t| t.to_rfc3339()),
            "fire_time": task.fire_time.to_rfc3339(),
            "created_at": task.created_at.to_rfc3339(),
        },
        "history": task.history,
    })
}
