//! Wire frames carried on the per-conversation socket
//!
//! The persistent connection carries exactly two frame kinds in both
//! directions: `message` and `typing`. Anything else is a protocol error and
//! is rejected by the parser.

use serde::{Deserialize, Serialize};

use super::identifiers::ParticipantId;
use super::messages::Message;

/// A frame on the conversation socket, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// A full message pushed by the backend (inbound) or echoed by a peer
    Message {
        /// The message payload
        message: Message,
    },
    /// A typing start/stop signal
    Typing {
        /// Participant the signal refers to; filled by the server on inbound
        /// frames, omitted on outbound frames (the server attributes them)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant: Option<ParticipantId>,
        /// Optional display name for the participant
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        /// true for a start signal, false for a stop signal
        started: bool,
    },
}

impl Frame {
    /// Build an outbound typing frame
    #[must_use]
    pub fn typing(started: bool) -> Self {
        Self::Typing {
            participant: None,
            display_name: None,
            started,
        }
    }
}

/// Direction-agnostic typing signal emitted by the local debouncer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    /// The operator started composing
    Start,
    /// The operator stopped composing (idle timeout, cleared input, or send)
    Stop,
}

impl TypingSignal {
    /// Convert the signal into its outbound wire frame
    #[must_use]
    pub fn into_frame(self) -> Frame {
        Frame::typing(matches!(self, Self::Start))
    }
}
