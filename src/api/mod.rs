//! Conversation REST API
//!
//! The backend owns conversations and messages; this module is the
//! read-through/write-through surface the session layer reconciles against.
//! The [`ConversationApi`] trait is the seam the session tests substitute a
//! mock for.

mod rest;

use crate::error::Result;
use crate::types::conversation::{Channel, Contact, Conversation, NewContact, VideoSession};
use crate::types::identifiers::{ContactId, ConversationId};
use crate::types::messages::{Message, NewMessage};

pub use rest::RestClient;

/// Client interface to the conversation backend
///
/// All methods are cheap to clone into background tasks; implementations
/// wrap shared connection pools.
pub trait ConversationApi: Clone + Send + Sync + 'static {
    /// Fetch all conversation summaries
    ///
    /// Filtering happens client-side; see
    /// [`ConversationFilter`](crate::types::ConversationFilter).
    fn list_conversations(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>>> + Send;

    /// Fetch the ordered message list of one conversation
    fn fetch_messages(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Vec<Message>>> + Send;

    /// Create a message in a conversation, returning the created message
    ///
    /// A failed send returns an error and leaves no local trace - a message
    /// never appears delivered unless the backend confirmed it.
    fn send_message(
        &self,
        conversation: &ConversationId,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<Message>> + Send;

    /// Start a new conversation with a contact on a channel
    fn create_conversation(
        &self,
        contact: &ContactId,
        channel: Channel,
    ) -> impl std::future::Future<Output = Result<Conversation>> + Send;

    /// Close a conversation, returning the updated summary
    fn close_conversation(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Conversation>> + Send;

    /// Transfer a conversation to another operator or department
    fn transfer_conversation(
        &self,
        conversation: &ConversationId,
        target: &str,
    ) -> impl std::future::Future<Output = Result<Conversation>> + Send;

    /// Toggle the favorite flag, returning the updated summary
    fn toggle_favorite(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<Conversation>> + Send;

    /// Request a video session for a conversation
    fn request_video_session(
        &self,
        conversation: &ConversationId,
    ) -> impl std::future::Future<Output = Result<VideoSession>> + Send;

    /// Create a contact directory entry
    fn create_contact(
        &self,
        contact: &NewContact,
    ) -> impl std::future::Future<Output = Result<Contact>> + Send;

    /// Look up a contact by id
    fn get_contact(
        &self,
        contact: &ContactId,
    ) -> impl std::future::Future<Output = Result<Contact>> + Send;

    /// Search the contact directory
    fn search_contacts(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Contact>>> + Send;
}
