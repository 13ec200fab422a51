//! Frame reading logic for the WebSocket transport

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::error::{InboxError, Result};
use crate::message::parse_frame_str;
use crate::types::frames::Frame;

use super::transport::WebSocketTransport;

impl WebSocketTransport {
    /// Read frames from the socket
    ///
    /// Spawns a background task that parses incoming text payloads into
    /// typed frames. Ping/pong and binary payloads are skipped; a close
    /// frame or a stream error ends the task and closes the receiver.
    pub(super) fn read_frames_impl(&mut self) -> mpsc::UnboundedReceiver<Result<Frame>> {
        let (tx, rx) = mpsc::unbounded_channel();

        let stream = self.stream.take();

        let task = tokio::spawn(async move {
            let Some(mut stream) = stream else {
                let _ = tx.send(Err(InboxError::connection(
                    "Not connected - socket stream not available",
                )));
                return;
            };

            while let Some(item) = stream.next().await {
                match item {
                    Ok(WsMessage::Text(payload)) => {
                        let parsed = parse_frame_str(payload.as_str());
                        if tx.send(parsed).is_err() {
                            // Receiver dropped, stop reading
                            break;
                        }
                    }
                    Ok(WsMessage::Close(_)) => break,
                    Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Binary(_)) => {}
                    Ok(WsMessage::Frame(_)) => {}
                    Err(e) => {
                        let _ = tx.send(Err(InboxError::transport(format!("Socket error: {e}"))));
                        break;
                    }
                }
            }
        });

        self.reader_task = Some(task);

        rx
    }
}
