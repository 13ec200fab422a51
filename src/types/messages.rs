//! Message-related type definitions
//!
//! A message is an immutable unit belonging to exactly one conversation.
//! Messages within a conversation are totally ordered by creation timestamp;
//! the reconciliation layer never presents them out of order no matter which
//! source (push event, refetch, send confirmation) delivered them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::MessageId;

// ============================================================================
// Message Types
// ============================================================================

/// Direction of a message relative to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sent by the external contact
    Inbound,
    /// Sent by the operator or bot
    Outbound,
}

/// Content kind of a message
///
/// Only text is exercised today; the enum exists so media kinds can be added
/// without a wire format break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain text content
    Text,
}

/// Delivery status progression for an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Accepted by the backend, not yet handed to the channel
    Pending,
    /// Handed to the channel
    Sent,
    /// Confirmed delivered to the contact's device
    Delivered,
    /// Read by the contact
    Read,
}

/// A single message within a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier - the sole de-duplication key
    pub id: MessageId,
    /// Direction relative to the operator
    pub direction: Direction,
    /// Content kind
    pub kind: MessageKind,
    /// Message content
    pub content: String,
    /// Creation timestamp - the ordering key within a conversation
    pub created_at: DateTime<Utc>,
    /// Delivery status
    pub status: DeliveryStatus,
}

impl Message {
    /// Whether this message originated from the external contact
    #[must_use]
    pub fn is_inbound(&self) -> bool {
        self.direction == Direction::Inbound
    }
}

/// Body of `POST /conversations/{id}/messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    /// Content kind
    pub kind: MessageKind,
    /// Message content
    pub content: String,
}

impl NewMessage {
    /// Create a new text message body
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.into(),
        }
    }
}
