//! Delivery client — one outbound HTTP POST of a JSON envelope.
//!
//! No retry, no redirect handling beyond the transport default, no circuit
//! breaking. A delivery either gets a 2xx inside the timeout or it is a
//! failure the caller records and swallows.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The JSON object sent over the wire to the destination. Field names are a
/// contract with the downstream automation and must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub task_id: String,
    pub content: String,
    /// Timestamp of the send attempt, RFC 3339.
    pub timestamp: String,
    pub status: String,
}

impl Envelope {
    /// Envelope for a scheduled dispatch.
    pub fn delivery(task_id: &str, content: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            content: content.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            status: "delivered".to_string(),
        }
    }

    /// Envelope for a connectivity test send.
    pub fn test(content: &str) -> Self {
        Self {
            task_id: "test".to_string(),
            content: content.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            status: "test".to_string(),
        }
    }
}

/// A 2xx acknowledgement from the destination.
#[derive(Debug, Clone)]
pub struct DeliveryResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP client bound to the single configured destination URL.
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    /// POST the envelope to the destination. Ok on any 2xx; everything else
    /// (non-2xx, connect error, timeout, DNS failure) is an Err with a
    /// descriptive message.
    pub async fn deliver(&self, envelope: &Envelope) -> Result<DeliveryResponse, String> {
        let resp = self
            .http
            .post(&self.url)
            .json(envelope)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("Webhook send failed: {e}"))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(DeliveryResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(format!("Webhook error {status}: {body}"))
        }
    }
}
