//! WebSocket transport implementation for the conversation socket

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::SinkExt;
use futures::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::error::{InboxError, Result};
use crate::transport::Transport;
use crate::types::frames::Frame;
use crate::types::options::Credential;

/// The underlying socket stream type
pub(super) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport for one conversation
///
/// Single-use: once closed, the connection manager constructs a fresh
/// instance through the factory for any reconnect.
pub struct WebSocketTransport {
    pub(super) endpoint: String,
    pub(super) credential: Credential,
    pub(super) sink: Option<SplitSink<WsStream, WsMessage>>,
    pub(super) stream: Option<SplitStream<WsStream>>,
    pub(super) ready: Arc<AtomicBool>,
    pub(super) reader_task: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    /// Create a new unconnected transport for the given endpoint
    #[must_use]
    pub fn new(endpoint: String, credential: Credential) -> Self {
        Self {
            endpoint,
            credential,
            sink: None,
            stream: None,
            ready: Arc::new(AtomicBool::new(false)),
            reader_task: None,
        }
    }
}

impl Transport for WebSocketTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        if !self.is_ready() {
            return Err(InboxError::transport("Transport is not ready for sending"));
        }

        let payload = serde_json::to_string(frame)?;

        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| InboxError::transport("socket sink not available"))?;

        sink.send(WsMessage::text(payload))
            .await
            .map_err(|e| InboxError::transport(format!("Failed to send frame: {e}")))?;

        Ok(())
    }

    fn read_frames(&mut self) -> mpsc::UnboundedReceiver<Result<Frame>> {
        self.read_frames_impl()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn close(&mut self) -> Result<()> {
        self.close_impl().await
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.drop_impl();
    }
}
