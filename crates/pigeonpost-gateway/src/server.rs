//! HTTP server implementation using Axum.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pigeonpost_core::PigeonConfig;
use pigeonpost_core::config::GatewayConfig;
use pigeonpost_relay::{DelayStrategy, TaskStore, WebhookClient};

/// Shared state for the gateway server.
///
/// The store and webhook client are the only resources shared between
/// request handlers and in-flight dispatch workers; both are owned here
/// and injected, never ambient.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    pub store: Arc<TaskStore>,
    pub webhook: Arc<WebhookClient>,
    pub strategy: DelayStrategy,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(shared: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(super::routes::home))
        .route(
            "/test-webhook",
            get(super::routes::test_webhook).post(super::routes::test_webhook_with_body),
        )
        .route("/schedule", post(super::routes::schedule))
        .route("/status", get(super::routes::status))
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(config: &PigeonConfig) -> anyhow::Result<()> {
    let strategy = DelayStrategy::from_config(&config.schedule)
        .map_err(|e| anyhow::anyhow!("Invalid schedule config: {e}"))?;

    if config.webhook.url.is_empty() {
        tracing::warn!(
            "⚠️ No destination webhook URL configured — deliveries will fail until PIGEONPOST_WEBHOOK_URL is set"
        );
    } else {
        tracing::info!("📬 Destination webhook: {}", config.webhook.url);
    }

    let state = AppState {
        gateway_config: config.gateway.clone(),
        store: Arc::new(TaskStore::new()),
        webhook: Arc::new(WebhookClient::new(
            config.webhook.url.clone(),
            Duration::from_secs(config.webhook.timeout_secs),
        )),
        strategy,
        start_time: std::time::Instant::now(),
    };

    match state.strategy {
        DelayStrategy::Fixed { delay } => {
            tracing::info!("⏰ Delay strategy: fixed, {}s after request", delay.num_seconds());
        }
        DelayStrategy::Offset { offset } => {
            tracing::info!(
                "⏰ Delay strategy: appointment time + {}m offset",
                offset.num_minutes()
            );
        }
    }

    let app = build_router(Arc::new(state));

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
