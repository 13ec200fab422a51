//! Session background task
//!
//! Owns the transcript, the typing state, and the connection for the
//! currently-selected conversation. Everything mutates on this one task, so
//! the concurrency hazard that remains is stale asynchronous completions -
//! guarded by a selection epoch compared on every completion.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot, watch};

use crate::api::ConversationApi;
use crate::connection::ConnectionManager;
use crate::error::{InboxError, Result};
use crate::message::{MergeOutcome, Transcript};
use crate::transport::TransportFactory;
use crate::types::frames::{Frame, TypingSignal};
use crate::types::identifiers::ConversationId;
use crate::types::messages::{Message, NewMessage};
use crate::types::options::{Credential, ParticipantRole};
use crate::typing::{PeerTypingSet, TypingDebouncer};

use super::commands::SessionCommand;
use super::events::SessionEvent;

/// Interval at which expired peer typing entries are swept
const PEER_PRUNE_INTERVAL_MS: u64 = 1000;

/// Completion of a transcript refetch, tagged for staleness checks
pub(super) struct RefetchResult {
    pub epoch: u64,
    pub conversation: ConversationId,
    pub result: Result<Vec<Message>>,
}

pub(super) struct SessionActor<F: TransportFactory, A: ConversationApi> {
    pub api: A,
    pub role: ParticipantRole,
    pub credential: Credential,
    pub connection: ConnectionManager<F>,
    pub inbound_rx: mpsc::UnboundedReceiver<(ConversationId, Frame)>,
    pub debouncer: TypingDebouncer,
    pub signal_rx: mpsc::UnboundedReceiver<TypingSignal>,
    pub transcript: Transcript,
    pub cache: HashMap<ConversationId, Vec<Message>>,
    pub peers: PeerTypingSet,
    pub peer_expiry_enabled: bool,
    pub selected: Option<ConversationId>,
    pub epoch: u64,
    pub command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    pub refetch_tx: mpsc::UnboundedSender<RefetchResult>,
    pub refetch_rx: mpsc::UnboundedReceiver<RefetchResult>,
    pub events_tx: mpsc::UnboundedSender<SessionEvent>,
    pub transcript_tx: watch::Sender<Vec<Message>>,
    pub typing_tx: watch::Sender<Vec<String>>,
}

impl<F: TransportFactory, A: ConversationApi> SessionActor<F, A> {
    /// Run until a `Shutdown` command arrives or the client is dropped
    pub async fn run(mut self) {
        let mut prune_interval =
            tokio::time::interval(std::time::Duration::from_millis(PEER_PRUNE_INTERVAL_MS));

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(SessionCommand::Select { target, response_tx }) => {
                        let result = self.select(target).await;
                        let _ = response_tx.send(result);
                    }
                    Some(SessionCommand::SendMessage { content, response_tx }) => {
                        self.send_message(content, response_tx).await;
                    }
                    Some(SessionCommand::InputChanged { value }) => {
                        self.debouncer.on_input_changed(&value);
                    }
                    Some(SessionCommand::Shutdown { response_tx }) => {
                        self.shutdown().await;
                        let _ = response_tx.send(());
                        return;
                    }
                    None => {
                        self.shutdown().await;
                        return;
                    }
                },
                Some((conversation, frame)) = self.inbound_rx.recv() => {
                    self.handle_frame(conversation, frame);
                }
                Some(signal) = self.signal_rx.recv() => {
                    self.forward_typing(signal).await;
                }
                Some(refetch) = self.refetch_rx.recv() => {
                    self.handle_refetch(refetch);
                }
                _ = prune_interval.tick(), if self.peer_expiry_enabled => {
                    if self.peers.prune() {
                        self.publish_typing();
                    }
                }
            }
        }
    }

    /// Switch the selected conversation
    ///
    /// Runs the strict teardown-before-open order: flush the pending typing
    /// stop, close the old link, reset the local view, open the new link.
    async fn select(&mut self, target: Option<ConversationId>) -> Result<()> {
        if target == self.selected {
            // Cheap reads refresh, expensive connections do not reconnect.
            if let Some(id) = &self.selected {
                let _ = self
                    .events_tx
                    .send(SessionEvent::ContactPanelRefresh(id.clone()));
            }
            return Ok(());
        }

        // (1) a pending typing stop belongs to the old conversation
        self.flush_typing().await;

        // (2) the old link must reach Closed before anything else happens
        self.connection.close().await?;

        // (3) reset the local view; bumping the epoch renders every
        // in-flight completion for the old selection moot. The old
        // transcript is cached so returning to it paints instantly while
        // the refetch is in flight.
        if let Some(old) = self.selected.take() {
            self.cache.insert(old, self.transcript.messages().to_vec());
        }
        self.epoch += 1;
        self.transcript = match target
            .as_ref()
            .and_then(|id| self.cache.get(id))
        {
            Some(cached) => Transcript::from_cache(cached.clone()),
            None => Transcript::new(),
        };
        self.peers.clear();
        self.publish_transcript();
        self.publish_typing();
        self.selected = target.clone();

        // (4) open the new link and kick off the initial fetch
        if let Some(conversation) = target {
            self.spawn_refetch(conversation.clone());
            self.connection
                .open(Some(conversation), self.role, &self.credential)
                .await?;
        }

        Ok(())
    }

    /// Send a message in the selected conversation
    ///
    /// The typing stop always goes out before the message itself. The POST
    /// and the send-triggered refetch run off-task so inbound frames keep
    /// flowing while the request is in flight.
    async fn send_message(&mut self, content: String, response_tx: oneshot::Sender<Result<Message>>) {
        let Some(conversation) = self.selected.clone() else {
            let _ = response_tx.send(Err(InboxError::NoSelection));
            return;
        };

        self.flush_typing().await;

        let api = self.api.clone();
        let refetch_tx = self.refetch_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            match api
                .send_message(&conversation, &NewMessage::text(content))
                .await
            {
                Ok(message) => {
                    let _ = response_tx.send(Ok(message));
                    let result = api.fetch_messages(&conversation).await;
                    let _ = refetch_tx.send(RefetchResult {
                        epoch,
                        conversation,
                        result,
                    });
                }
                Err(e) => {
                    // Nothing was inserted locally; a failed send never
                    // appears delivered.
                    let _ = response_tx.send(Err(e));
                }
            }
        });
    }

    /// Emit any pending typing stop and forward queued signals in order
    async fn flush_typing(&mut self) {
        self.debouncer.flush();
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.forward_typing(signal).await;
        }
    }

    /// Forward a local typing signal to the peer, best-effort
    async fn forward_typing(&mut self, signal: TypingSignal) {
        if self.selected.is_none() {
            return;
        }
        if let Err(e) = self.connection.send(signal.into_frame()).await {
            log::debug!("typing signal dropped: {e}");
        }
    }

    /// Route an inbound frame, guarding against stale-link delivery
    fn handle_frame(&mut self, conversation: ConversationId, frame: Frame) {
        if self.selected.as_ref() != Some(&conversation) {
            log::debug!("[{conversation}] discarding frame for deselected conversation");
            return;
        }

        match frame {
            Frame::Message { message } => {
                let inbound = message.is_inbound();
                let outcome = self.transcript.merge_push(message);
                // An inbound message ends the sender's composition.
                if inbound && self.peers.clear() {
                    self.publish_typing();
                }
                self.apply_outcome(&conversation, outcome);
            }
            Frame::Typing {
                participant: Some(participant),
                display_name,
                started,
            } => {
                if self.peers.apply_signal(participant, display_name, started) {
                    self.publish_typing();
                }
            }
            Frame::Typing {
                participant: None, ..
            } => {
                log::warn!("[{conversation}] typing frame without participant");
            }
        }
    }

    /// Apply a refetch completion unless the selection moved on
    fn handle_refetch(&mut self, refetch: RefetchResult) {
        if refetch.epoch != self.epoch || self.selected.as_ref() != Some(&refetch.conversation) {
            log::debug!(
                "[{}] discarding refetch for a stale selection",
                refetch.conversation
            );
            return;
        }

        match refetch.result {
            Ok(messages) => {
                let outcome = self.transcript.merge_full(messages);
                self.apply_outcome(&refetch.conversation, outcome);
            }
            Err(e) => {
                // Last-known-good transcript stays untouched.
                log::warn!("[{}] refetch failed: {e}", refetch.conversation);
                let _ = self.events_tx.send(SessionEvent::SyncFailed {
                    conversation: refetch.conversation,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Publish a merge outcome's side effects
    fn apply_outcome(&mut self, conversation: &ConversationId, outcome: MergeOutcome) {
        // A refetch can replace cache-seeded content without changing the
        // transcript length, so added messages force a publish on their own.
        if outcome.added > 0 || outcome.length_changed || outcome.status_changed {
            self.publish_transcript();
        }
        if outcome.needs_summary_refresh() {
            let _ = self
                .events_tx
                .send(SessionEvent::RefreshSummary(conversation.clone()));
        }
        if outcome.needs_scroll() {
            let _ = self.events_tx.send(SessionEvent::ScrollToLatest);
        }
    }

    /// Start a background refetch for the given conversation
    fn spawn_refetch(&self, conversation: ConversationId) {
        let api = self.api.clone();
        let refetch_tx = self.refetch_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = api.fetch_messages(&conversation).await;
            let _ = refetch_tx.send(RefetchResult {
                epoch,
                conversation,
                result,
            });
        });
    }

    fn publish_transcript(&self) {
        let _ = self.transcript_tx.send(self.transcript.messages().to_vec());
    }

    fn publish_typing(&self) {
        let _ = self.typing_tx.send(self.peers.names());
    }

    /// Teardown with no new selection: flush typing, close the link
    async fn shutdown(&mut self) {
        self.flush_typing().await;
        if let Err(e) = self.connection.close().await {
            log::warn!("session shutdown: {e}");
        }
    }
}
