//! # PigeonPost Relay
//!
//! The deferred-dispatch core: accept a message, hold it until its fire
//! time, then POST it as a JSON envelope to the configured destination.
//!
//! ## Design Principles
//! - One-shot timer per task — no recurring tick loop, no head-of-line
//!   blocking between pending deliveries
//! - In-memory task registry with append-only attempt history
//! - Delivery failures are recorded, never escalated
//!
//! ## Architecture
//! ```text
//! Gateway /schedule
//!   ├── DelayStrategy: fixed delay | appointment time + offset → fire_time
//!   ├── TaskStore.create → task id, status=scheduled
//!   └── schedule_once(fire_time) → tokio::spawn + sleep
//!         └── on fire → dispatch
//!               ├── WebhookClient: POST envelope (10s timeout)
//!               └── TaskStore.complete → delivered | failed + attempt record
//! ```

pub mod deliver;
pub mod dispatch;
pub mod scheduler;
pub mod store;
pub mod task;

pub use deliver::{DeliveryResponse, Envelope, WebhookClient};
pub use dispatch::dispatch;
pub use scheduler::{DelayStrategy, schedule_once};
pub use store::TaskStore;
pub use task::{AttemptOutcome, AttemptRecord, Task, TaskStatus};
