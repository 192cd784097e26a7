mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, ClientSettings, HealthSettings, LogSettings, Settings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Environment keys use `__` between section and field, e.g. `CLIENT__SUBSCRIBE`
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("__"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    let broker = partial.broker.as_ref();
    let health = partial.health.as_ref();
    let client = partial.client.as_ref();
    let log = partial.log.as_ref();

    Ok(Settings {
        broker: BrokerSettings {
            url: broker
                .and_then(|b| b.url.clone())
                .unwrap_or(default.broker.url),
            user_id: broker
                .and_then(|b| b.user_id.clone())
                .unwrap_or(default.broker.user_id),
            connect_timeout_ms: broker
                .and_then(|b| b.connect_timeout_ms)
                .unwrap_or(default.broker.connect_timeout_ms),
        },
        health: HealthSettings {
            url: health
                .and_then(|h| h.url.clone())
                .unwrap_or(default.health.url),
            timeout_ms: health
                .and_then(|h| h.timeout_ms)
                .unwrap_or(default.health.timeout_ms),
        },
        client: ClientSettings {
            subscribe: client
                .and_then(|c| c.subscribe.clone())
                .unwrap_or(default.client.subscribe),
            retry_interval_ms: client
                .and_then(|c| c.retry_interval_ms)
                .unwrap_or(default.client.retry_interval_ms),
        },
        log: LogSettings {
            level: log
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
    })
}
