use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration settings for the client.
///
/// Groups the broker connection, the health probe, the client behaviour
/// and logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub health: HealthSettings,
    pub client: ClientSettings,
    pub log: LogSettings,
}

/// Configuration settings for the broker connection.
///
/// `user_id` is sent as the `userId` header on the STOMP CONNECT frame.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub url: String,
    pub user_id: String,
    pub connect_timeout_ms: u64,
}

/// Configuration settings for the health probe.
#[derive(Debug, Deserialize, Clone)]
pub struct HealthSettings {
    pub url: String,
    pub timeout_ms: u64,
}

/// Configuration settings for the client behaviour.
///
/// `subscribe` is the pipe-delimited topic list, e.g. `chat|notice`.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    pub subscribe: String,
    pub retry_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub health: Option<PartialHealthSettings>,
    pub client: Option<PartialClientSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub url: Option<String>,
    pub user_id: Option<String>,
    pub connect_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialHealthSettings {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub subscribe: Option<String>,
    pub retry_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl BrokerSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl HealthSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ClientSettings {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// Provides default values for `Settings`.
///
/// These match a broker and health endpoint running on `localhost:9901`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                url: "ws://localhost:9901/websocket".to_string(),
                user_id: "back-end".to_string(),
                connect_timeout_ms: 10_000,
            },
            health: HealthSettings {
                url: "http://localhost:9901/ccfe/health".to_string(),
                timeout_ms: 5_000,
            },
            client: ClientSettings {
                subscribe: String::new(),
                retry_interval_ms: 3_000,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
