//! `InboxClient` method implementations

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot, watch};

use super::InboxClient;
use crate::api::ConversationApi;
use crate::error::{InboxError, Result};
use crate::session::{SessionCommand, SessionEvent, spawn_session};
use crate::transport::TransportFactory;
use crate::types::conversation::{
    Channel, Contact, Conversation, ConversationFilter, NewContact, VideoSession,
};
use crate::types::identifiers::{ContactId, ConversationId};
use crate::types::messages::Message;
use crate::types::options::InboxOptions;

impl<A: ConversationApi> InboxClient<A> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a client from an explicit transport factory and API
    /// implementation
    ///
    /// This is the seam used by tests: any [`TransportFactory`] and
    /// [`ConversationApi`] pair works. Production code goes through
    /// [`InboxClient::new`].
    pub fn with_parts<F>(factory: F, api: A, options: &InboxOptions) -> Result<Self>
    where
        F: TransportFactory,
    {
        let handle = spawn_session(factory, api.clone(), options)?;
        Ok(Self {
            api,
            command_tx: handle.command_tx,
            events_rx: Some(handle.events_rx),
            connectivity_rx: handle.connectivity_rx,
            transcript_rx: handle.transcript_rx,
            typing_rx: handle.typing_rx,
            conversations: Arc::new(RwLock::new(Vec::new())),
        })
    }

    // ========================================================================
    // Session operations
    // ========================================================================

    /// Select a conversation (or clear the selection with `None`)
    ///
    /// Resolves only after the previous connection (if any) fully closed and
    /// the new connection attempt started, so two selections in sequence can
    /// never leave both links open. Re-selecting the current conversation is
    /// a no-op apart from a [`SessionEvent::ContactPanelRefresh`].
    ///
    /// # Errors
    /// Returns error if the session task has shut down
    pub async fn select_conversation(&self, target: Option<ConversationId>) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::Select {
                target,
                response_tx,
            })
            .map_err(|_| InboxError::session_closed("session task has shut down"))?;
        response_rx
            .await
            .map_err(|_| InboxError::session_closed("session task has shut down"))?
    }

    /// Send a text message on the selected conversation
    ///
    /// Flushes any pending typing indicator first, so the stop signal reaches
    /// the peer before the message does. The returned [`Message`] is the
    /// server-confirmed record; it appears in the transcript through the
    /// post-send refetch, never optimistically.
    ///
    /// # Errors
    /// Returns [`InboxError::NoSelection`] if no conversation is selected,
    /// or the API error if the send failed (in which case the transcript is
    /// untouched)
    pub async fn send_message(&self, content: impl Into<String>) -> Result<Message> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::SendMessage {
                content: content.into(),
                response_tx,
            })
            .map_err(|_| InboxError::session_closed("session task has shut down"))?;
        response_rx
            .await
            .map_err(|_| InboxError::session_closed("session task has shut down"))?
    }

    /// Report the current contents of the input field
    ///
    /// Drives the typing debouncer: the first keystroke emits a start signal,
    /// continued edits push the idle deadline forward, and clearing the field
    /// emits an immediate stop.
    ///
    /// # Errors
    /// Returns error if the session task has shut down
    pub fn on_input_changed(&self, value: impl Into<String>) -> Result<()> {
        self.command_tx
            .send(SessionCommand::InputChanged {
                value: value.into(),
            })
            .map_err(|_| InboxError::session_closed("session task has shut down"))
    }

    /// Shut down the session task, closing any open connection
    ///
    /// # Errors
    /// Returns error if the session task already exited
    pub async fn close(&self) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::Shutdown { response_tx })
            .map_err(|_| InboxError::session_closed("session task has shut down"))?;
        response_rx.await.map_err(|_| InboxError::session_closed("session task has shut down"))
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Watch the Online/Offline indicator
    ///
    /// `true` while a conversation link is open. Early reconnect attempts do
    /// not flip this; it drops to `false` only after repeated failures or an
    /// explicit close.
    pub fn connectivity(&self) -> watch::Receiver<bool> {
        self.connectivity_rx.clone()
    }

    /// Watch the transcript of the selected conversation
    ///
    /// Always ordered by creation time. A selection change resets it to the
    /// target's last-known transcript (empty for a first visit) until the
    /// refetch lands.
    pub fn transcript(&self) -> watch::Receiver<Vec<Message>> {
        self.transcript_rx.clone()
    }

    /// Watch the display names of peers currently typing
    pub fn typing_peers(&self) -> watch::Receiver<Vec<String>> {
        self.typing_rx.clone()
    }

    /// Take the session event receiver
    ///
    /// Events cover the side effects a UI reacts to: summary refreshes,
    /// scroll-to-latest, contact panel refreshes, and sync failures. Can be
    /// taken once; returns `None` afterwards.
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<SessionEvent>> {
        self.events_rx.take()
    }

    /// Receive the next session event
    ///
    /// Returns `None` if the receiver was taken via
    /// [`take_event_receiver`](Self::take_event_receiver) or the session
    /// ended.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        match self.events_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    // ========================================================================
    // Conversation list
    // ========================================================================

    /// Fetch the conversation list from the server and replace the local
    /// cache
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn refresh_conversations(&self) -> Result<Vec<Conversation>> {
        let fetched = self.api.list_conversations().await?;
        *self.conversations.write() = fetched.clone();
        Ok(fetched)
    }

    /// Cached conversation summaries from the last refresh
    pub fn conversations(&self) -> Vec<Conversation> {
        self.conversations.read().clone()
    }

    /// Cached conversations matching a filter
    pub fn filtered_conversations(&self, filter: &ConversationFilter) -> Vec<Conversation> {
        self.conversations
            .read()
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect()
    }

    // ========================================================================
    // Conversation actions
    // ========================================================================

    /// Start a new conversation with a contact on a channel
    ///
    /// The new conversation is added to the local cache.
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn start_conversation(
        &self,
        contact: &ContactId,
        channel: Channel,
    ) -> Result<Conversation> {
        let conversation = self.api.create_conversation(contact, channel).await?;
        self.upsert_cached(conversation.clone());
        Ok(conversation)
    }

    /// Close a conversation
    ///
    /// Returns the updated summary, which also replaces the cached entry.
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn close_conversation(&self, conversation: &ConversationId) -> Result<Conversation> {
        let updated = self.api.close_conversation(conversation).await?;
        self.upsert_cached(updated.clone());
        Ok(updated)
    }

    /// Transfer a conversation to another operator or department
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn transfer_conversation(
        &self,
        conversation: &ConversationId,
        target: &str,
    ) -> Result<Conversation> {
        let updated = self.api.transfer_conversation(conversation, target).await?;
        self.upsert_cached(updated.clone());
        Ok(updated)
    }

    /// Toggle the favorite flag on a conversation
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn toggle_favorite(&self, conversation: &ConversationId) -> Result<Conversation> {
        let updated = self.api.toggle_favorite(conversation).await?;
        self.upsert_cached(updated.clone());
        Ok(updated)
    }

    /// Request a video session link for a conversation
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn request_video_session(
        &self,
        conversation: &ConversationId,
    ) -> Result<VideoSession> {
        self.api.request_video_session(conversation).await
    }

    // ========================================================================
    // Contacts
    // ========================================================================

    /// Create a contact
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        self.api.create_contact(contact).await
    }

    /// Fetch a contact by id
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn get_contact(&self, contact: &ContactId) -> Result<Contact> {
        self.api.get_contact(contact).await
    }

    /// Search contacts by name, phone, or email
    ///
    /// # Errors
    /// Returns error if the request failed
    pub async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>> {
        self.api.search_contacts(query).await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn upsert_cached(&self, conversation: Conversation) {
        let mut cache = self.conversations.write();
        match cache.iter_mut().find(|c| c.id == conversation.id) {
            Some(existing) => *existing = conversation,
            None => cache.insert(0, conversation),
        }
    }
}
