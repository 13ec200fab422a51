//! Conversation session management
//!
//! A session is one background task owning the currently-selected
//! conversation's connection, transcript, and typing state. The client
//! facade talks to it through a command channel; projections flow back
//! through watch channels and a session event stream.

mod actor;
mod commands;
mod events;

pub use events::SessionEvent;

pub(crate) use commands::SessionCommand;

use tokio::sync::{mpsc, watch};

use crate::api::ConversationApi;
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::message::Transcript;
use crate::transport::TransportFactory;
use crate::types::messages::Message;
use crate::types::options::InboxOptions;
use crate::typing::{PeerTypingSet, TypingDebouncer};

use actor::SessionActor;

/// Handle to a running session task
pub(crate) struct SessionHandle {
    /// Command channel into the session actor
    pub command_tx: mpsc::UnboundedSender<SessionCommand>,
    /// Session event stream for the UI
    pub events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    /// Online/Offline indicator
    pub connectivity_rx: watch::Receiver<bool>,
    /// Ordered transcript of the selected conversation
    pub transcript_rx: watch::Receiver<Vec<Message>>,
    /// Display names of currently-typing peers
    pub typing_rx: watch::Receiver<Vec<String>>,
}

/// Spawn a session task for the given transport factory and API client
///
/// # Errors
/// Returns `InvalidConfig` when no credential is configured
pub(crate) fn spawn_session<F, A>(
    factory: F,
    api: A,
    options: &InboxOptions,
) -> Result<SessionHandle>
where
    F: TransportFactory,
    A: ConversationApi,
{
    let credential = options.effective_credential()?;

    let (connection, inbound_rx) = ConnectionManager::new(factory, options.backoff.clone());
    let connectivity_rx = connection.connectivity();

    let (debouncer, signal_rx) = TypingDebouncer::new(options.typing_idle_timeout);
    let peers = PeerTypingSet::new(options.peer_typing_expiry);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (refetch_tx, refetch_rx) = mpsc::unbounded_channel();
    let (transcript_tx, transcript_rx) = watch::channel(Vec::new());
    let (typing_tx, typing_rx) = watch::channel(Vec::new());

    let actor = SessionActor {
        api,
        role: options.role,
        credential,
        connection,
        inbound_rx,
        debouncer,
        signal_rx,
        transcript: Transcript::new(),
        cache: std::collections::HashMap::new(),
        peers,
        peer_expiry_enabled: options.peer_typing_expiry.is_some(),
        selected: None,
        epoch: 0,
        command_rx,
        refetch_tx,
        refetch_rx,
        events_tx,
        transcript_tx,
        typing_tx,
    };
    tokio::spawn(actor.run());

    Ok(SessionHandle {
        command_tx,
        events_rx,
        connectivity_rx,
        transcript_rx,
        typing_rx,
    })
}
