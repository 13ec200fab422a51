//! Transcript reconciliation
//!
//! Produces one ordered, duplicate-free transcript per conversation out of
//! three sources: periodic full refetches, push-delivered single messages,
//! and send-triggered refetches. The message identifier is the sole
//! de-duplication key; the creation timestamp is the sole ordering key.

use std::collections::{HashMap, HashSet};

use crate::types::identifiers::MessageId;
use crate::types::messages::Message;

/// Result of a merge, consumed by the session layer to decide side effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of messages added by this merge
    pub added: usize,
    /// How many of the added messages are inbound
    pub added_inbound: usize,
    /// Whether the transcript length changed
    pub length_changed: bool,
    /// Whether any already-present message changed delivery status
    pub status_changed: bool,
}

impl MergeOutcome {
    /// Whether the conversation summary (last-message timestamp, unread
    /// counters) must be refreshed upstream
    #[must_use]
    pub fn needs_summary_refresh(&self) -> bool {
        self.added_inbound > 0
    }

    /// Whether the UI should scroll to the latest message
    ///
    /// Fires once per merge that changes the transcript length, never on
    /// pure status updates such as read-receipt changes.
    #[must_use]
    pub fn needs_scroll(&self) -> bool {
        self.length_changed
    }
}

/// Ordered, de-duplicated transcript of one conversation
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcript seeded from a cached message list
    #[must_use]
    pub fn from_cache(messages: Vec<Message>) -> Self {
        let mut transcript = Self::new();
        transcript.merge_full(messages);
        transcript
    }

    /// Messages in creation-timestamp order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Discard all messages (used when the selection changes)
    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }

    /// Merge a single push-delivered message
    ///
    /// Insertion keeps creation-timestamp order; a message whose identifier
    /// is already present is discarded (a push event and a later refetch may
    /// both deliver it).
    pub fn merge_push(&mut self, message: Message) -> MergeOutcome {
        if self.ids.contains(&message.id) {
            return MergeOutcome::default();
        }

        let inbound = message.is_inbound();
        // Insert after any equal timestamps so arrival order breaks ties.
        let position = self
            .messages
            .partition_point(|m| m.created_at <= message.created_at);
        self.ids.insert(message.id.clone());
        self.messages.insert(position, message);

        MergeOutcome {
            added: 1,
            added_inbound: usize::from(inbound),
            length_changed: true,
            status_changed: false,
        }
    }

    /// Merge a full replacement list from a refetch
    ///
    /// The incoming list is de-duplicated by identifier and stably sorted by
    /// creation timestamp before replacing the current transcript. The
    /// outcome reports what actually changed so redundant refetches stay
    /// idempotent.
    pub fn merge_full(&mut self, incoming: Vec<Message>) -> MergeOutcome {
        let old_len = self.messages.len();
        let old_status: HashMap<MessageId, _> = self
            .messages
            .iter()
            .map(|m| (m.id.clone(), m.status))
            .collect();

        let mut seen = HashSet::with_capacity(incoming.len());
        let mut messages: Vec<Message> = incoming
            .into_iter()
            .filter(|m| seen.insert(m.id.clone()))
            .collect();
        messages.sort_by_key(|m| m.created_at);

        let mut added = 0;
        let mut added_inbound = 0;
        let mut status_changed = false;
        for message in &messages {
            match old_status.get(&message.id) {
                None => {
                    added += 1;
                    if message.is_inbound() {
                        added_inbound += 1;
                    }
                }
                Some(status) if *status != message.status => status_changed = true,
                Some(_) => {}
            }
        }

        self.ids = seen;
        self.messages = messages;

        MergeOutcome {
            added,
            added_inbound,
            length_changed: self.messages.len() != old_len,
            status_changed,
        }
    }
}
