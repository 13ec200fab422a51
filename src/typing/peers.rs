//! Peer typing presence set
//!
//! Tracks which remote participants are currently composing, keyed by
//! participant id. An entry is removed by an explicit stop signal, by an
//! inbound message from the conversation, or - when configured - by a
//! client-side expiry so a peer that disconnects mid-typing does not leave
//! a permanent ghost indicator.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::identifiers::ParticipantId;

struct PeerEntry {
    display_name: Option<String>,
    renewed_at: Instant,
}

/// Set of remote participants currently typing in the selected conversation
pub struct PeerTypingSet {
    entries: HashMap<ParticipantId, PeerEntry>,
    expiry: Option<Duration>,
}

impl PeerTypingSet {
    /// Create an empty set with the given expiry window (`None` disables
    /// client-side expiry; the set is then exactly as fresh as the last
    /// signal received)
    #[must_use]
    pub fn new(expiry: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            expiry,
        }
    }

    /// Apply a peer start/stop signal
    ///
    /// A start adds or renews the participant, overwriting the display name
    /// when one is provided. A stop removes it. Returns whether the visible
    /// set changed.
    pub fn apply_signal(
        &mut self,
        participant: ParticipantId,
        display_name: Option<String>,
        started: bool,
    ) -> bool {
        if started {
            let now = Instant::now();
            match self.entries.get_mut(&participant) {
                Some(entry) => {
                    entry.renewed_at = now;
                    if display_name.is_some() && entry.display_name != display_name {
                        entry.display_name = display_name;
                        true
                    } else {
                        false
                    }
                }
                None => {
                    self.entries.insert(
                        participant,
                        PeerEntry {
                            display_name,
                            renewed_at: now,
                        },
                    );
                    true
                }
            }
        } else {
            self.entries.remove(&participant).is_some()
        }
    }

    /// Remove entries that were not renewed within the expiry window
    ///
    /// Returns whether anything was removed. No-op when expiry is disabled.
    pub fn prune(&mut self) -> bool {
        let Some(expiry) = self.expiry else {
            return false;
        };
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.renewed_at) < expiry);
        self.entries.len() != before
    }

    /// Drop all entries, e.g. when an inbound message ends the composition
    /// or the selection changes
    ///
    /// Returns whether the set was non-empty.
    pub fn clear(&mut self) -> bool {
        let was_populated = !self.entries.is_empty();
        self.entries.clear();
        was_populated
    }

    /// Whether no peer is currently typing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display names of currently-typing peers, sorted for stable output
    ///
    /// Falls back to the participant id when no display name was provided.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .map(|(id, entry)| {
                entry
                    .display_name
                    .clone()
                    .unwrap_or_else(|| id.as_str().to_string())
            })
            .collect();
        names.sort();
        names
    }
}
