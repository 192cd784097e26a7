//! The `transport` module is responsible for talking to the broker.
//!
//! It defines the STOMP frame codec, the [`Connector`] and [`Session`] seams
//! the connection manager is generic over, and the websocket implementation
//! of both.

pub mod frame;
pub mod websocket;

use std::future::Future;

use crate::utils::ClientError;

pub use frame::{Command, StompFrame};
pub use websocket::{StompConnector, StompSession};

/// Opens broker sessions. One call is one connect attempt, handshake included.
pub trait Connector: Send + Sync {
    type Session: Session;

    fn connect(&self) -> impl Future<Output = Result<Self::Session, ClientError>> + Send;
}

/// A live broker session.
pub trait Session: Send {
    fn session_id(&self) -> &str;

    /// The CONNECTED frame the broker answered the handshake with.
    fn connected_frame(&self) -> &StompFrame;

    fn subscribe(
        &mut self,
        destination: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn send(
        &mut self,
        destination: &str,
        body: String,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Waits for the next frame. `None` once the session is closed.
    fn next_frame(&mut self) -> impl Future<Output = Option<Result<StompFrame, ClientError>>> + Send;

    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

#[cfg(test)]
mod tests;
