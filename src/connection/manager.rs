//! Connection manager owning at most one live link

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::error::{InboxError, Result};
use crate::transport::TransportFactory;
use crate::types::frames::Frame;
use crate::types::identifiers::ConversationId;
use crate::types::options::{BackoffPolicy, Credential, ParticipantRole};

use super::link::{LinkCommand, LinkContext, run_link};
use super::state::ConnectionState;

struct Link {
    conversation: ConversationId,
    command_tx: mpsc::UnboundedSender<LinkCommand>,
    state_rx: watch::Receiver<ConnectionState>,
    task: tokio::task::JoinHandle<()>,
}

/// Maintains one live connection per selected conversation
///
/// `open` is idempotent for the currently-connected conversation; opening a
/// different conversation tears the old link down synchronously first, so an
/// old link always reaches `Closed` before a new one starts connecting.
pub struct ConnectionManager<F: TransportFactory> {
    factory: Arc<F>,
    backoff: BackoffPolicy,
    connectivity_tx: watch::Sender<bool>,
    inbound_tx: mpsc::UnboundedSender<(ConversationId, Frame)>,
    link: Option<Link>,
}

impl<F: TransportFactory> ConnectionManager<F> {
    /// Create a manager and the receiver its inbound frames are delivered on
    ///
    /// Frames are tagged with the conversation they arrived for, so a late
    /// frame from a torn-down link can never be misattributed.
    #[must_use]
    pub fn new(
        factory: F,
        backoff: BackoffPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<(ConversationId, Frame)>) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        // Connectivity writers use send_replace so the stored value stays
        // current even while no receiver is subscribed.
        let (connectivity_tx, _) = watch::channel(false);
        let manager = Self {
            factory: Arc::new(factory),
            backoff,
            connectivity_tx,
            inbound_tx,
            link: None,
        };
        (manager, inbound_rx)
    }

    /// Subscribe to the Online/Offline connectivity indicator
    #[must_use]
    pub fn connectivity(&self) -> watch::Receiver<bool> {
        self.connectivity_tx.subscribe()
    }

    /// Conversation the current link belongs to, if any
    #[must_use]
    pub fn conversation(&self) -> Option<&ConversationId> {
        self.link.as_ref().map(|link| &link.conversation)
    }

    /// Current connection state (`Idle` when no link exists)
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.link
            .as_ref()
            .map_or(ConnectionState::Idle, |link| *link.state_rx.borrow())
    }

    /// Watch the current link's state transitions, if a link exists
    #[must_use]
    pub fn state_watch(&self) -> Option<watch::Receiver<ConnectionState>> {
        self.link.as_ref().map(|link| link.state_rx.clone())
    }

    /// Open a connection for the given conversation
    ///
    /// Calling with the already-connected conversation is a no-op. Calling
    /// with a different conversation closes the old link first, and only
    /// returns once the new link task is running. Calling with `None` forces
    /// `Closed` and releases all resources.
    ///
    /// # Errors
    /// Returns error if the old link cannot be torn down
    pub async fn open(
        &mut self,
        conversation: Option<ConversationId>,
        role: ParticipantRole,
        credential: &Credential,
    ) -> Result<()> {
        let Some(conversation) = conversation else {
            return self.close().await;
        };

        if let Some(link) = &self.link
            && link.conversation == conversation
            && *link.state_rx.borrow() != ConnectionState::Closed
        {
            return Ok(());
        }

        self.close().await?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);

        let ctx = LinkContext {
            factory: Arc::clone(&self.factory),
            conversation: conversation.clone(),
            role,
            credential: credential.clone(),
            backoff: self.backoff.clone(),
            state_tx,
            connectivity_tx: self.connectivity_tx.clone(),
            inbound_tx: self.inbound_tx.clone(),
        };
        let task = tokio::spawn(run_link(ctx, command_rx));

        self.link = Some(Link {
            conversation,
            command_tx,
            state_rx,
            task,
        });

        Ok(())
    }

    /// Close the current link, waiting until it reached `Closed`
    ///
    /// # Errors
    /// Currently infallible; kept fallible for parity with `open`
    pub async fn close(&mut self) -> Result<()> {
        let Some(link) = self.link.take() else {
            return Ok(());
        };

        let (response_tx, response_rx) = oneshot::channel();
        if link
            .command_tx
            .send(LinkCommand::Close { response_tx })
            .is_ok()
        {
            // The ack arrives strictly after the state reached Closed.
            let _ = response_rx.await;
        } else {
            link.task.abort();
        }
        self.connectivity_tx.send_replace(false);

        Ok(())
    }

    /// Send a frame on the current link
    ///
    /// # Errors
    /// Returns `NoSelection` if no link exists, or a transport error if the
    /// link is not open
    pub async fn send(&self, frame: Frame) -> Result<()> {
        let link = self.link.as_ref().ok_or(InboxError::NoSelection)?;

        let (response_tx, response_rx) = oneshot::channel();
        link.command_tx
            .send(LinkCommand::Send { frame, response_tx })
            .map_err(|_| InboxError::transport("link task has exited"))?;

        response_rx
            .await
            .map_err(|_| InboxError::transport("link task dropped the send"))?
    }
}

impl<F: TransportFactory> Drop for ConnectionManager<F> {
    fn drop(&mut self) {
        // Dropping the command sender makes the link task close itself.
        if let Some(link) = self.link.take() {
            drop(link.command_tx);
        }
    }
}
