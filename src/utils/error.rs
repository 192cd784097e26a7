//! The `error` module defines the error type shared by every failure site of
//! the client: the health probe, the transport and the session handler.
//!
//! Errors are `Clone` so a connection state can carry the reason for a retry.

use std::time::Duration;
use thiserror::Error;

/// Errors produced while probing, connecting or running a broker session.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The health endpoint answered, but not with `status: "UP"`.
    #[error("health check reported DOWN")]
    HealthDown,

    /// The health endpoint could not be reached or read.
    #[error("health check failed: {error}")]
    Health { error: String },

    /// The websocket connection could not be opened.
    #[error("failed to connect to {url}: {error}")]
    Connect { url: String, error: String },

    /// The broker refused the STOMP handshake or replied with something else.
    #[error("handshake rejected: {error}")]
    Handshake { error: String },

    /// A frame could not be parsed.
    #[error("protocol error: {error}")]
    Protocol { error: String },

    /// The underlying websocket failed while sending or receiving.
    #[error("transport error: {error}")]
    Transport { error: String },

    /// The broker sent an ERROR frame.
    #[error("broker error: {message}")]
    Broker { message: String },

    /// A message body could not be encoded or decoded.
    #[error("codec error: {error}")]
    Codec { error: String },

    /// The broker closed the session.
    #[error("session closed by broker")]
    SessionClosed,

    /// An operation did not finish in time.
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },
}

impl ClientError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ClientError::HealthDown => "health_down",
            ClientError::Health { .. } => "health_failed",
            ClientError::Connect { .. } => "connect_failed",
            ClientError::Handshake { .. } => "handshake_rejected",
            ClientError::Protocol { .. } => "protocol_error",
            ClientError::Transport { .. } => "transport_error",
            ClientError::Broker { .. } => "broker_error",
            ClientError::Codec { .. } => "codec_error",
            ClientError::SessionClosed => "session_closed",
            ClientError::Timeout { .. } => "timeout",
        }
    }

    /// True when the error concerns a single frame and the session can go on.
    ///
    /// A broker ERROR is recoverable here; the broker closes the socket itself.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClientError::Protocol { .. } | ClientError::Codec { .. } | ClientError::Broker { .. }
        )
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Codec {
            error: e.to_string(),
        }
    }
}

impl From<tungstenite::Error> for ClientError {
    fn from(e: tungstenite::Error) -> Self {
        ClientError::Transport {
            error: e.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Health {
            error: e.to_string(),
        }
    }
}
