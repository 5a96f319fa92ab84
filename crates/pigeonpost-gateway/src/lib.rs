//! # PigeonPost Gateway
//!
//! The HTTP-facing surface of the relay: accepts schedule requests,
//! answers status queries, and exposes a destination connectivity test.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
