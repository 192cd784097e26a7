//! WebSocket transport
//!
//! Speaks STOMP over a single websocket connection:
//! - `StompConnector` opens the socket and performs the CONNECT/CONNECTED handshake
//! - `StompSession` subscribes, sends and yields inbound MESSAGE/ERROR frames

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};
use tungstenite::http::Uri;
use tungstenite::protocol::Message as WsMessage;

use crate::config::BrokerSettings;
use crate::transport::frame::{Command, StompFrame};
use crate::transport::{Connector, Session};
use crate::utils::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct StompConnector {
    url: String,
    host: String,
    connect_headers: Vec<(String, String)>,
    connect_timeout: Duration,
}

impl StompConnector {
    pub fn new(settings: &BrokerSettings) -> Self {
        let host = settings
            .url
            .parse::<Uri>()
            .ok()
            .and_then(|uri| uri.host().map(str::to_string))
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            url: settings.url.clone(),
            host,
            connect_headers: vec![("userId".to_string(), settings.user_id.clone())],
            connect_timeout: settings.connect_timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn connect_frame(&self) -> StompFrame {
        let mut frame = StompFrame::new(Command::Connect)
            .header("accept-version", "1.2")
            .header("host", self.host.clone())
            .header("heart-beat", "0,0");
        frame.headers.extend(self.connect_headers.iter().cloned());
        frame
    }

    async fn handshake(&self) -> Result<StompSession, ClientError> {
        let (mut stream, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| ClientError::Connect {
                    url: self.url.clone(),
                    error: e.to_string(),
                })?;

        stream
            .send(WsMessage::text(self.connect_frame().encode()))
            .await?;

        let connected = loop {
            let frame = match stream.next().await {
                Some(Ok(msg)) => match decode_message(msg)? {
                    Some(frame) => frame,
                    None => continue,
                },
                Some(Err(e)) => return Err(e.into()),
                None => {
                    return Err(ClientError::Handshake {
                        error: "connection closed before CONNECTED".to_string(),
                    });
                }
            };

            match frame.command {
                Command::Connected => break frame,
                Command::Error => {
                    return Err(ClientError::Handshake {
                        error: frame.error_message(),
                    });
                }
                other => {
                    return Err(ClientError::Handshake {
                        error: format!("expected CONNECTED, got {other}"),
                    });
                }
            }
        };

        Ok(StompSession::new(stream, connected))
    }
}

impl Connector for StompConnector {
    type Session = StompSession;

    async fn connect(&self) -> Result<StompSession, ClientError> {
        match tokio::time::timeout(self.connect_timeout, self.handshake()).await {
            Ok(res) => res,
            Err(_) => Err(ClientError::Timeout {
                after: self.connect_timeout,
            }),
        }
    }
}

pub struct StompSession {
    id: String,
    connected: StompFrame,
    stream: WsStream,
    next_subscription: u64,
}

impl StompSession {
    fn new(stream: WsStream, connected: StompFrame) -> Self {
        let id = connected
            .get("session")
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            id,
            connected,
            stream,
            next_subscription: 0,
        }
    }

    async fn write(&mut self, frame: StompFrame) -> Result<(), ClientError> {
        self.stream.send(WsMessage::text(frame.encode())).await?;
        Ok(())
    }
}

impl std::fmt::Debug for StompSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StompSession")
            .field("id", &self.id)
            .field("subscriptions", &self.next_subscription)
            .finish()
    }
}

impl Session for StompSession {
    fn session_id(&self) -> &str {
        &self.id
    }

    fn connected_frame(&self) -> &StompFrame {
        &self.connected
    }

    async fn subscribe(&mut self, destination: &str) -> Result<(), ClientError> {
        let id = format!("sub-{}", self.next_subscription);
        self.next_subscription += 1;
        let frame = StompFrame::new(Command::Subscribe)
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto");
        self.write(frame).await
    }

    async fn send(&mut self, destination: &str, body: String) -> Result<(), ClientError> {
        let frame = StompFrame::new(Command::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .header("content-length", body.len().to_string())
            .body(body);
        self.write(frame).await
    }

    async fn next_frame(&mut self) -> Option<Result<StompFrame, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(WsMessage::Close(close)) => {
                    debug!(session = %self.id, ?close, "broker closed websocket");
                    return None;
                }
                Ok(msg) => match decode_message(msg) {
                    Ok(Some(frame)) => return Some(Ok(frame)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                },
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.write(StompFrame::new(Command::Disconnect)).await {
            debug!(session = %self.id, "DISCONNECT not sent: {e}");
        }
        if let Err(e) = self.stream.close(None).await {
            warn!(session = %self.id, "websocket close failed: {e}");
        }
    }
}

/// Decodes text and binary websocket messages; control messages yield `None`.
fn decode_message(msg: WsMessage) -> Result<Option<StompFrame>, ClientError> {
    match msg {
        WsMessage::Text(text) => StompFrame::decode(&text),
        WsMessage::Binary(bytes) => {
            let text = std::str::from_utf8(&bytes).map_err(|e| ClientError::Protocol {
                error: e.to_string(),
            })?;
            StompFrame::decode(text)
        }
        _ => Ok(None),
    }
}
