//! Type definitions for the DoctorQ inbox SDK
//!
//! This module contains all the type definitions used throughout the SDK,
//! organized into logical submodules:
//!
//! - [`identifiers`] - Type-safe ID wrappers (`ConversationId`, `MessageId`, ...)
//! - [`conversation`] - Conversations, channels, contacts, and filters
//! - [`messages`] - Messages, directions, and delivery statuses
//! - [`frames`] - Wire frames carried on the conversation socket
//! - [`options`] - Main configuration options and credentials

pub mod conversation;
pub mod frames;
pub mod identifiers;
pub mod messages;
pub mod options;

// Re-export commonly used types
pub use conversation::{
    Channel, Contact, Conversation, ConversationFilter, NewContact, StatusFilter, VideoSession,
};
pub use frames::{Frame, TypingSignal};
pub use identifiers::{ContactId, ConversationId, MessageId, ParticipantId};
pub use messages::{DeliveryStatus, Direction, Message, MessageKind, NewMessage};
pub use options::{BackoffPolicy, Credential, InboxOptions, InboxOptionsBuilder, ParticipantRole};
