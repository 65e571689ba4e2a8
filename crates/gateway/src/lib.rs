#![deny(unused)]
//! HTTP gateway for SafeCross.
//!
//! Serves the speech proxy (`POST /api/tts`), the configured signal list,
//! and a stateless proximity check.

pub mod server;
pub mod telemetry;
pub mod tts;

pub use server::{GatewayConfig, GatewayServer};
pub use telemetry::{configure_tracing, setup_metrics_recorder};
pub use tts::GoogleTtsClient;
