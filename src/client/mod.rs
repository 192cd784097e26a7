//! The `client` module is the long-lived broker client.
//!
//! [`ConnectionManager`] owns the health-gated connect/retry loop,
//! [`SessionHandler`] does the per-session work (subscriptions, the presence
//! notice, inbound dispatch) and [`Topics`] is the configured subscription set.

pub mod handler;
pub mod manager;
pub mod state;
pub mod topics;

pub use handler::SessionHandler;
pub use manager::{ClientHandle, ConnectionManager};
pub use state::ConnectionState;
pub use topics::Topics;

use crate::config::Settings;
use crate::health::HttpHealthProbe;
use crate::transport::StompConnector;
use crate::utils::ClientError;

/// Builds the production client from `settings` and starts it in the background.
///
/// Must be called inside a tokio runtime. Returns immediately; connecting
/// happens on the spawned task.
pub fn start(settings: &Settings) -> Result<ClientHandle, ClientError> {
    let probe = HttpHealthProbe::new(&settings.health)?;
    let connector = StompConnector::new(&settings.broker);
    let handler = SessionHandler::new(Topics::parse(&settings.client.subscribe));

    let manager = ConnectionManager::new(
        probe,
        connector,
        handler,
        settings.client.retry_interval(),
    );
    Ok(manager.spawn())
}
