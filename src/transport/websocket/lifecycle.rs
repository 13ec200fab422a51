//! Lifecycle management for the WebSocket transport (connect, close)

use std::sync::atomic::Ordering;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;

use crate::error::{InboxError, Result};

use super::transport::WebSocketTransport;

impl WebSocketTransport {
    /// Connect to the conversation socket
    ///
    /// Performs the WebSocket handshake with a bearer Authorization header
    /// and splits the stream so reads and writes proceed independently.
    ///
    /// # Errors
    /// Returns error if the request cannot be built or the handshake fails
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.sink.is_some() {
            return Ok(());
        }

        let mut request = self
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| InboxError::connection(format!("Invalid socket endpoint: {e}")))?;

        let bearer = format!("Bearer {}", self.credential.as_str());
        let header = HeaderValue::from_str(&bearer)
            .map_err(|e| InboxError::connection(format!("Invalid credential header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, header);

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| InboxError::connection(format!("WebSocket handshake failed: {e}")))?;

        let (sink, stream) = stream.split();
        self.sink = Some(sink);
        self.stream = Some(stream);
        self.ready.store(true, Ordering::SeqCst);

        log::debug!("connected to {}", self.endpoint);
        Ok(())
    }

    /// Close the transport and clean up resources
    ///
    /// # Errors
    /// Returns error if cleanup fails
    pub(super) async fn close_impl(&mut self) -> Result<()> {
        self.ready.store(false, Ordering::SeqCst);

        // Best-effort close frame; the peer may already be gone.
        if let Some(mut sink) = self.sink.take() {
            let _ = sink.send(WsMessage::Close(None)).await;
            let _ = sink.close().await;
        }

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }

        self.stream = None;
        Ok(())
    }

    /// Handle Drop cleanup
    pub(super) fn drop_impl(&mut self) {
        self.ready.store(false, Ordering::SeqCst);

        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }
}
