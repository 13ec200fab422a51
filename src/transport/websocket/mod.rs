//! WebSocket transport for the per-conversation socket
//!
//! One transport per connection attempt; the factory derives the endpoint
//! from the conversation id and the configured socket base URL.

mod lifecycle;
mod reader;
mod transport;

pub use transport::WebSocketTransport;

use crate::error::Result;
use crate::transport::TransportFactory;
use crate::types::identifiers::ConversationId;
use crate::types::options::{Credential, ParticipantRole};

/// Factory producing [`WebSocketTransport`] instances
#[derive(Debug, Clone)]
pub struct WebSocketTransportFactory {
    socket_base: String,
}

impl WebSocketTransportFactory {
    /// Create a factory for the given socket base URL
    /// (e.g. `wss://api.example.com`)
    #[must_use]
    pub fn new(socket_base: impl Into<String>) -> Self {
        Self {
            socket_base: socket_base.into(),
        }
    }
}

impl TransportFactory for WebSocketTransportFactory {
    type Transport = WebSocketTransport;

    fn create(
        &self,
        conversation: &ConversationId,
        role: ParticipantRole,
        credential: &Credential,
    ) -> Result<Self::Transport> {
        let endpoint = format!(
            "{}/conversations/{}/socket?role={}",
            self.socket_base.trim_end_matches('/'),
            conversation,
            role,
        );
        Ok(WebSocketTransport::new(endpoint, credential.clone()))
    }
}
