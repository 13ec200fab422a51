//! Events surfaced from the session to the UI layer

use crate::types::identifiers::ConversationId;

/// Side effects the UI should react to
///
/// None of these are errors in the session itself; they are the upward
/// signals the reconciliation and selection contracts require.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The conversation summary (last-message timestamp, unread counters)
    /// is stale and should be refetched
    RefreshSummary(ConversationId),

    /// The transcript grew; the view should scroll to the latest message
    ScrollToLatest,

    /// The contact-info side panel should refresh (emitted when the current
    /// conversation is re-selected)
    ContactPanelRefresh(ConversationId),

    /// A transcript refetch failed; the last-known-good transcript was
    /// retained and the failure should be surfaced non-fatally
    SyncFailed {
        /// Conversation the refetch belonged to
        conversation: ConversationId,
        /// Human-readable failure description
        error: String,
    },
}
