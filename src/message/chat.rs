use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::utils::ClientError;

/// Kind of chat event. Serialized as the upper-case variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Enter,
    Quit,
    Chat,
    Notice,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Enter => "ENTER",
            MessageType::Quit => "QUIT",
            MessageType::Chat => "CHAT",
            MessageType::Notice => "NOTICE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ENTER" => Some(MessageType::Enter),
            "QUIT" => Some(MessageType::Quit),
            "CHAT" => Some(MessageType::Chat),
            "NOTICE" => Some(MessageType::Notice),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents one chat or system event.
///
/// The same shape travels in both directions: the client publishes a
/// `NOTICE` on every connect and receives events from the topics it
/// subscribed to.
///
/// # Fields
///
/// - `kind` - The event type, serialized as `type`.
/// - `name` - Display name of the sender.
/// - `message` - Free-text payload.
/// - `date` - Display timestamp, already formatted by whoever built the message.
///
/// # Example
///
/// ```rust
/// use ccbe_client::message::{ChatMessage, MessageType};
///
/// let msg = ChatMessage::new(MessageType::Chat, "alice", "hi", "2026. 10. 18 PM 1:05:09");
/// assert_eq!(msg.kind, MessageType::Chat);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
}

/// `null` decodes the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    pub fn new(
        kind: MessageType,
        name: impl Into<String>,
        message: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            message: message.into(),
            date: date.into(),
        }
    }

    pub fn notice(
        name: impl Into<String>,
        message: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self::new(MessageType::Notice, name, message, date)
    }

    /// Decodes an inbound frame body.
    ///
    /// Returns `Ok(None)` when `type` is missing or not one of the known kinds.
    pub fn from_payload(body: &str) -> Result<Option<Self>, ClientError> {
        let value: Value = serde_json::from_str(body)?;
        let known = value
            .get("type")
            .and_then(Value::as_str)
            .and_then(MessageType::from_name)
            .is_some();
        if !known {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChatMessage(type={}, name={}, message={}, date={})",
            self.kind, self.name, self.message, self.date
        )
    }
}
