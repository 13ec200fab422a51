//! Transport layer for the per-conversation socket
//!
//! This module provides the transport abstraction and the WebSocket
//! implementation used to talk to the DoctorQ messaging backend. One
//! transport instance corresponds to one logical connection for one
//! conversation; reconnection builds a fresh instance through a
//! [`TransportFactory`].

pub mod websocket;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::frames::Frame;
use crate::types::identifiers::ConversationId;
use crate::types::options::{Credential, ParticipantRole};

/// Transport trait for one conversation socket
///
/// This trait defines the interface for sending and receiving frames on an
/// established connection. Implementations are single-use: after `close`,
/// a new instance is constructed for any further connection.
pub trait Transport: Send + Sync {
    /// Connect and authenticate the transport
    ///
    /// # Errors
    /// Returns error if the handshake fails
    fn connect(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Send a frame to the peer
    ///
    /// # Errors
    /// Returns error if the send fails or the transport is not ready
    fn send(&mut self, frame: &Frame) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read frames from the transport
    ///
    /// Returns a receiver that yields parsed frames. This method spawns a
    /// background task to read frames, allowing concurrent sends. The
    /// receiver is closed when the connection ends or errors.
    fn read_frames(&mut self) -> mpsc::UnboundedReceiver<Result<Frame>>;

    /// Check if the transport is ready for communication
    fn is_ready(&self) -> bool;

    /// Close the transport and clean up resources
    ///
    /// # Errors
    /// Returns error if cleanup fails
    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Factory producing transports for the connection manager
///
/// The manager reconnects by constructing a fresh transport for the same
/// conversation, so the factory - not the transport - is long-lived. Tests
/// substitute a recording factory here.
pub trait TransportFactory: Send + Sync + 'static {
    /// Transport type produced by this factory
    type Transport: Transport + Send + 'static;

    /// Build an unconnected transport for the given conversation
    ///
    /// # Errors
    /// Returns error if the endpoint cannot be constructed
    fn create(
        &self,
        conversation: &ConversationId,
        role: ParticipantRole,
        credential: &Credential,
    ) -> Result<Self::Transport>;
}

pub use websocket::{WebSocketTransport, WebSocketTransportFactory};
