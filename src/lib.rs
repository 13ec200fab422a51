//! # DoctorQ Inbox Client for Rust
//!
//! Client library for the DoctorQ omnichannel inbox: operators and bots hold
//! real-time conversations with patients across WhatsApp, Instagram, Facebook,
//! Telegram, email, web chat, and SMS through one API.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doctorq_inbox::{InboxClient, InboxOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = InboxOptions::builder()
//!         .api_base("https://api.doctorq.example")
//!         .socket_base("wss://api.doctorq.example")
//!         .credential("session-token")
//!         .build();
//!
//!     let client = InboxClient::new(options)?;
//!
//!     let conversations = client.refresh_conversations().await?;
//!     if let Some(first) = conversations.first() {
//!         client.select_conversation(Some(first.id.clone())).await?;
//!         client.send_message("Hello, how can I help?").await?;
//!     }
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Core Pieces
//!
//! - [`InboxClient`]: conversation selection, message sending, typing
//!   signals, and REST actions
//! - [`connection`]: per-conversation WebSocket lifecycle with capped
//!   exponential reconnect backoff
//! - [`typing`]: outbound typing debouncer and inbound peer typing set
//! - [`message`]: frame parsing and transcript reconciliation
//! - [`session`]: the background task tying the above together
//!
//! At most one conversation socket is open at a time. Selecting a new
//! conversation closes the old link before the new one dials, and everything
//! tagged with a previous conversation (frames, refetch completions) is
//! discarded rather than applied to the wrong transcript.
//!
//! ## Projections
//!
//! UI state flows out through `watch` channels rather than callbacks:
//! connectivity ([`InboxClient::connectivity`]), the ordered transcript
//! ([`InboxClient::transcript`]), and peer typing names
//! ([`InboxClient::typing_peers`]). One-shot side effects (scroll to latest,
//! refresh a summary card) arrive as [`SessionEvent`]s.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, InboxError>`](Result). Errors
//! carry enough context to distinguish transport failures (retried
//! automatically) from API rejections (surfaced to the caller).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod client;
pub mod connection;
pub mod error;
pub mod message;
pub mod session;
pub mod transport;
pub mod types;
pub mod typing;

// Re-export commonly used types for external API
pub use api::{ConversationApi, RestClient};
pub use client::InboxClient;
pub use connection::{ConnectionManager, ConnectionState};
pub use error::{InboxError, Result};
pub use message::{MergeOutcome, Transcript, parse_frame, parse_frame_str};
pub use session::SessionEvent;
pub use transport::{Transport, TransportFactory, WebSocketTransport, WebSocketTransportFactory};
pub use typing::{PeerTypingSet, TypingDebouncer};

// Re-export type submodules for flat public API
pub use types::conversation::{
    Channel, Contact, Conversation, ConversationFilter, NewContact, StatusFilter, VideoSession,
};
pub use types::frames::{Frame, TypingSignal};
pub use types::identifiers::{ContactId, ConversationId, MessageId, ParticipantId};
pub use types::messages::{DeliveryStatus, Direction, Message, MessageKind, NewMessage};
pub use types::options::{
    BackoffPolicy, Credential, InboxOptions, InboxOptionsBuilder, ParticipantRole,
};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
