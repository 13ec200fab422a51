//! Session command protocol
//!
//! Defines the command messages the client facade sends to the session
//! background task via channels, keeping all conversation state on one task
//! with no shared locks.

use tokio::sync::oneshot;

use crate::error::Result;
use crate::types::identifiers::ConversationId;
use crate::types::messages::Message;

/// Commands that can be sent to the session background task
pub(crate) enum SessionCommand {
    /// Change the selected conversation (or deselect with `None`)
    Select {
        /// Target conversation
        target: Option<ConversationId>,
        /// Channel to send the operation result back
        response_tx: oneshot::Sender<Result<()>>,
    },

    /// Send a text message in the selected conversation
    SendMessage {
        /// Message content
        content: String,
        /// Resolves with the backend-confirmed message
        response_tx: oneshot::Sender<Result<Message>>,
    },

    /// The operator's input field changed
    InputChanged {
        /// Current input value
        value: String,
    },

    /// Shut the session down gracefully
    Shutdown {
        /// Acknowledged once the connection is closed
        response_tx: oneshot::Sender<()>,
    },
}
