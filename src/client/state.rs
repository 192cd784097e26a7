use std::fmt;

use crate::utils::ClientError;

/// Where the connection manager is in its connect/retry cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    CheckingHealth,
    Connecting,
    Connected { session_id: String },
    /// Waiting out the retry interval after `reason`.
    RetryWait { reason: ClientError },
    /// Shut down; no further attempts.
    Stopped,
}

impl ConnectionState {
    pub fn as_label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::CheckingHealth => "checking_health",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected { .. } => "connected",
            ConnectionState::RetryWait { .. } => "retry_wait",
            ConnectionState::Stopped => "stopped",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected { .. })
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connected { session_id } => write!(f, "connected ({session_id})"),
            ConnectionState::RetryWait { reason } => write!(f, "retry wait ({reason})"),
            other => f.write_str(other.as_label()),
        }
    }
}
