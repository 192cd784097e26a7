//! The `message` module defines the chat event exchanged with the broker.

pub mod chat;

pub use chat::{ChatMessage, MessageType};
