//! `InboxClient` - the operator-facing entry point
//!
//! This module provides the main client for the omnichannel inbox: conversation
//! selection, message sending, typing signals, and the read-only projections
//! the UI binds to.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        InboxClient                         │
//! │                                                            │
//! │  commands ──────────────► Session task                     │
//! │  (select / send / input)    │  owns: ConnectionManager     │
//! │                             │        TypingDebouncer       │
//! │  projections ◄──────────────┘        Transcript, PeerSet   │
//! │  (connectivity, transcript,                                │
//! │   typing peers, events)                                    │
//! │                                                            │
//! │  REST actions ──────────► ConversationApi (direct)         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! **Key design points:**
//! - All conversation state lives on one session task; the client holds only
//!   channels, so every method takes `&self` and the client is `Send`.
//! - Commands resolve through oneshot acks, which is what makes
//!   `select_conversation` return only after the old link reached `Closed`.
//! - Conversation summaries are cached locally and filtered client-side.
//!
//! # Example
//!
//! ```no_run
//! use doctorq_inbox::{InboxClient, InboxOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InboxOptions::builder()
//!     .api_base("https://api.doctorq.example")
//!     .socket_base("wss://api.doctorq.example")
//!     .credential("session-token")
//!     .build();
//!
//! let client = InboxClient::new(options)?;
//!
//! let conversations = client.refresh_conversations().await?;
//! if let Some(first) = conversations.first() {
//!     client.select_conversation(Some(first.id.clone())).await?;
//!     client.on_input_changed("hello")?;
//!     client.send_message("hello").await?;
//! }
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

mod client_impl;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};

use crate::api::{ConversationApi, RestClient};
use crate::session::{SessionCommand, SessionEvent};
use crate::types::conversation::Conversation;
use crate::types::messages::Message;
use crate::types::options::InboxOptions;

/// Client for the DoctorQ omnichannel inbox
///
/// Owns a background session task enforcing the one-active-connection
/// invariant, plus a cached conversation list refreshed through the REST API.
pub struct InboxClient<A: ConversationApi = RestClient> {
    /// REST surface used directly for conversation/contact actions
    api: A,
    /// Command channel into the session task
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    /// Session event stream (if not taken by the caller)
    events_rx: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    /// Online/Offline indicator
    connectivity_rx: watch::Receiver<bool>,
    /// Ordered transcript of the selected conversation
    transcript_rx: watch::Receiver<Vec<Message>>,
    /// Display names of currently-typing peers
    typing_rx: watch::Receiver<Vec<String>>,
    /// Cached conversation summaries
    conversations: Arc<RwLock<Vec<Conversation>>>,
}

impl InboxClient<RestClient> {
    /// Create a client from options, wiring the WebSocket transport and the
    /// REST client
    ///
    /// Must be called within a tokio runtime: the session task is spawned
    /// immediately.
    ///
    /// # Errors
    /// Returns error if no credential is configured or the HTTP client
    /// cannot be built
    pub fn new(options: InboxOptions) -> crate::error::Result<Self> {
        let credential = options.effective_credential()?;
        let api = RestClient::new(
            options.api_base.clone(),
            credential,
            options.request_timeout,
        )?;
        let factory = crate::transport::WebSocketTransportFactory::new(options.socket_base.clone());
        Self::with_parts(factory, api, &options)
    }
}
