//! # ccbe-client
//!
//! `ccbe-client` is a background client that keeps one STOMP-over-WebSocket
//! session open to a chat broker. Every connect attempt is gated on an HTTP
//! health check; on any failure it waits a fixed interval and tries again.
//! Each session subscribes to the configured topics, announces the backend
//! with a NOTICE and logs every inbound chat event by type.
//!
//! ## Core Modules
//!
//! - `client`: The connection manager, its state machine and the session handler.
//! - `config`: Handles loading settings from defaults, `config/default.toml` and the environment.
//! - `health`: The HTTP health probe that gates connect attempts.
//! - `message`: The chat event exchanged with the broker.
//! - `transport`: STOMP framing and the WebSocket connector/session.
//! - `utils`: The shared error type and logging bootstrap.

pub mod client;
pub mod config;
pub mod health;
pub mod message;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
