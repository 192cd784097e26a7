use ccbe_client::client;
use ccbe_client::config::load_config;
use ccbe_client::utils::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            return;
        }
    };
    logging::init(&config.log.level);

    let handle = match client::start(&config) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Client failed to start: {}", e);
            return;
        }
    };
    info!(
        broker = %config.broker.url,
        topics = %config.client.subscribe,
        "client started"
    );

    if let Err(e) = wait_for_shutdown_signal().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received. Exiting gracefully.");
    handle.shutdown().await;
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
