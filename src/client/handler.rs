//! Per-session behaviour: subscribe and announce on connect, then log every
//! inbound chat event by type.

use chrono::Local;
use tracing::{debug, info, warn};

use crate::client::topics::Topics;
use crate::message::{ChatMessage, MessageType};
use crate::transport::{Command, Session, StompFrame};
use crate::utils::ClientError;

/// Sender name used for messages published by this process.
pub const BACKEND_NAME: &str = "Back-End서버";
pub const GREETING: &str = "안녕";
pub const NOTICE_DESTINATION: &str = "/app/chat/notice";

/// `yyyy. M. d a h:mm:ss`
///
/// chrono's `%p` always renders `AM`/`PM`. In that pattern `a` is a
/// locale-specific marker, e.g. `오전`/`오후` under a Korean locale.
const DATE_FORMAT: &str = "%Y. %-m. %-d %p %-I:%M:%S";

#[derive(Debug, Clone)]
pub struct SessionHandler {
    topics: Topics,
}

impl SessionHandler {
    pub fn new(topics: Topics) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Subscribes to every configured topic, then publishes one NOTICE.
    pub async fn on_connected<S: Session>(&self, session: &mut S) -> Result<(), ClientError> {
        for destination in self.topics.destinations() {
            session.subscribe(&destination).await?;
            debug!(session = session.session_id(), %destination, "subscribed");
        }

        let notice = ChatMessage::notice(BACKEND_NAME, GREETING, notice_date());
        session
            .send(NOTICE_DESTINATION, serde_json::to_string(&notice)?)
            .await?;

        let user_id = session.connected_frame().get("userId").unwrap_or_default();
        info!("New session: {} | {}", session.session_id(), user_id);
        Ok(())
    }

    /// Routes one inbound frame. Nothing here ends the session.
    pub fn handle(&self, session_id: &str, frame: &StompFrame) {
        match frame.command {
            Command::Message => {
                if let Err(e) = self.on_frame(frame) {
                    self.on_error(session_id, Some(frame), &e);
                }
            }
            Command::Error => {
                let error = ClientError::Broker {
                    message: frame.error_message(),
                };
                self.on_error(session_id, Some(frame), &error);
            }
            other => debug!(session = session_id, command = %other, "ignoring frame"),
        }
    }

    /// Decodes a MESSAGE body and logs it under its type.
    ///
    /// Returns the dispatched type, or `None` for a type this client does not know.
    pub fn on_frame(&self, frame: &StompFrame) -> Result<Option<MessageType>, ClientError> {
        let destination = frame.get("destination").unwrap_or_default();
        match ChatMessage::from_payload(&frame.body)? {
            Some(message) => {
                info!("{}", dispatch_line(destination, &message));
                Ok(Some(message.kind))
            }
            None => {
                debug!(%destination, body = %frame.body, "ignoring message of unknown type");
                Ok(None)
            }
        }
    }

    pub fn on_error(&self, session_id: &str, frame: Option<&StompFrame>, error: &ClientError) {
        warn!(
            session = session_id,
            command = frame.map(|f| f.command.as_str()),
            reason = error.as_label(),
            "session error: {error}"
        );
    }
}

/// The log line for a dispatched message: `[CHAT] [/topic/chat] >>> ChatMessage(...)`.
pub fn dispatch_line(destination: &str, message: &ChatMessage) -> String {
    format!("[{}] [{}] >>> {}", message.kind, destination, message)
}

fn notice_date() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}
