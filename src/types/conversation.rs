//! Conversation and contact types
//!
//! A conversation is a persistent thread between one external contact and the
//! operator/bot, over exactly one channel. Conversations are owned by the
//! backend; the client holds a read-through cache refreshed by fetch-and-merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::{ContactId, ConversationId};

// ============================================================================
// Channels
// ============================================================================

/// Transport/medium of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// WhatsApp (telephony messaging)
    Whatsapp,
    /// Instagram direct messages
    Instagram,
    /// Facebook Messenger
    Facebook,
    /// Telegram
    Telegram,
    /// E-mail
    Email,
    /// Embedded web chat widget
    WebChat,
    /// Plain SMS
    Sms,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Whatsapp => "whatsapp",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Telegram => "telegram",
            Self::Email => "email",
            Self::WebChat => "web_chat",
            Self::Sms => "sms",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Conversation
// ============================================================================

/// A conversation summary as returned by `GET /conversations`
///
/// Never hard-deleted by the backend, only closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier
    pub id: ConversationId,
    /// Contact on the other side of the thread
    pub contact_id: ContactId,
    /// Channel this thread lives on
    pub channel: Channel,
    /// Whether the conversation is still open
    pub open: bool,
    /// Whether the bot is currently driving the conversation
    pub bot_active: bool,
    /// Whether the contact is waiting for a human operator
    pub awaiting_human: bool,
    /// Whether the operator marked this thread as a favorite
    pub favorite: bool,
    /// Timestamp of the most recent message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
    /// Total message count
    #[serde(default)]
    pub message_count: u32,
    /// Inbound (contact-originated) message count
    #[serde(default)]
    pub inbound_count: u32,
}

// ============================================================================
// Conversation filtering (client-side)
// ============================================================================

/// Status filter for conversation lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Open and closed conversations
    #[default]
    All,
    /// Only open conversations
    Open,
    /// Only closed conversations
    Closed,
}

/// Client-side filter applied to the cached conversation list
///
/// The backend supports the same filters, but this client filters locally so
/// the inbox list reacts without a round trip.
#[derive(Debug, Clone, Default)]
pub struct ConversationFilter {
    /// Restrict to a single channel
    pub channel: Option<Channel>,
    /// Restrict by open/closed status
    pub status: StatusFilter,
    /// Free-text search over the conversation identifiers
    pub search: Option<String>,
    /// Only favorites
    pub favorites_only: bool,
}

impl ConversationFilter {
    /// Check whether a conversation passes this filter
    #[must_use]
    pub fn matches(&self, conversation: &Conversation) -> bool {
        if let Some(channel) = self.channel
            && conversation.channel != channel
        {
            return false;
        }

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Open => {
                if !conversation.open {
                    return false;
                }
            }
            StatusFilter::Closed => {
                if conversation.open {
                    return false;
                }
            }
        }

        if self.favorites_only && !conversation.favorite {
            return false;
        }

        if let Some(ref query) = self.search {
            let query = query.to_lowercase();
            if !query.is_empty()
                && !conversation.id.as_str().to_lowercase().contains(&query)
                && !conversation
                    .contact_id
                    .as_str()
                    .to_lowercase()
                    .contains(&query)
            {
                return false;
            }
        }

        true
    }
}

// ============================================================================
// Contacts
// ============================================================================

/// A contact directory entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Unique contact identifier
    pub id: ContactId,
    /// Display name
    pub name: String,
    /// Phone number, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// E-mail address, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of `POST /contacts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    /// Display name
    pub name: String,
    /// Phone number, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// E-mail address, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Payload returned by `POST /conversations/{id}/video`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSession {
    /// URL of the created video session
    pub url: String,
}
