//! Connection manager
//!
//! Owns the connect/retry loop. Every attempt is gated on the health probe;
//! any failure (probe down, connect error, session end) waits out the retry
//! interval and tries again, until the shutdown token is cancelled.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::client::handler::SessionHandler;
use crate::client::state::ConnectionState;
use crate::health::HealthProbe;
use crate::transport::{Connector, Session};
use crate::utils::ClientError;

enum Outcome {
    Retry(ClientError),
    Shutdown,
}

pub struct ConnectionManager<P, C> {
    probe: P,
    connector: C,
    handler: SessionHandler,
    retry_interval: Duration,
    state: watch::Sender<ConnectionState>,
}

impl<P, C> ConnectionManager<P, C>
where
    P: HealthProbe + 'static,
    C: Connector + 'static,
{
    pub fn new(probe: P, connector: C, handler: SessionHandler, retry_interval: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            probe,
            connector,
            handler,
            retry_interval,
            state,
        }
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Runs the loop on its own task and returns a handle to observe and stop it.
    pub fn spawn(self) -> ClientHandle {
        let token = CancellationToken::new();
        let state = self.subscribe_state();
        let task = tokio::spawn(self.run(token.clone()));
        ClientHandle { token, task, state }
    }

    /// Connects, serves the session, and retries until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            let reason = match self.attempt(attempt, &shutdown).await {
                Outcome::Retry(reason) => reason,
                Outcome::Shutdown => break,
            };

            info!(
                attempt,
                reason = reason.as_label(),
                "[websocket connect] Sleep and connect retry: {reason}"
            );
            self.set_state(ConnectionState::RetryWait { reason });

            let sleep = time::sleep(self.retry_interval);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = shutdown.cancelled() => break,
            }
        }

        self.set_state(ConnectionState::Stopped);
        info!("[websocket connect] stopped");
    }

    async fn attempt(&self, attempt: u64, shutdown: &CancellationToken) -> Outcome {
        info!(attempt, "[websocket connect] start trying");
        self.set_state(ConnectionState::CheckingHealth);

        let healthy = select! {
            up = self.probe.check_health() => up,
            _ = shutdown.cancelled() => return Outcome::Shutdown,
        };
        if !healthy {
            info!("[websocket connect] Server health check : DOWN");
            return Outcome::Retry(ClientError::HealthDown);
        }
        info!("[websocket connect] Server health check : UP");

        self.set_state(ConnectionState::Connecting);
        let connected = select! {
            res = self.connector.connect() => res,
            _ = shutdown.cancelled() => return Outcome::Shutdown,
        };
        let mut session = match connected {
            Ok(session) => session,
            Err(e) => return Outcome::Retry(e),
        };

        let outcome = self.serve(&mut session, shutdown).await;
        session.close().await;
        outcome
    }

    /// Drives one session until it ends or shutdown is requested.
    async fn serve<S: Session>(&self, session: &mut S, shutdown: &CancellationToken) -> Outcome {
        let session_id = session.session_id().to_string();
        self.set_state(ConnectionState::Connected {
            session_id: session_id.clone(),
        });

        let announced = select! {
            res = self.handler.on_connected(session) => res,
            _ = shutdown.cancelled() => return Outcome::Shutdown,
        };
        if let Err(e) = announced {
            warn!(session = %session_id, "subscribe/announce failed: {e}");
            return Outcome::Retry(e);
        }

        loop {
            let next = select! {
                next = session.next_frame() => next,
                _ = shutdown.cancelled() => return Outcome::Shutdown,
            };
            match next {
                Some(Ok(frame)) => self.handler.handle(&session_id, &frame),
                Some(Err(e)) if e.is_recoverable() => self.handler.on_error(&session_id, None, &e),
                Some(Err(e)) => return Outcome::Retry(e),
                None => return Outcome::Retry(ClientError::SessionClosed),
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }
}

/// Handle to a running client task.
#[derive(Debug)]
pub struct ClientHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
    state: watch::Receiver<ConnectionState>,
}

impl ClientHandle {
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Token that stops the client when cancelled, for wiring into a host's shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancels any pending retry, closes the active session and waits for the task.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            error!("client task failed: {e}");
        }
    }
}
