//! reqwest-backed implementation of the conversation REST API

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{InboxError, Result};
use crate::types::conversation::{Channel, Contact, Conversation, NewContact, VideoSession};
use crate::types::identifiers::{ContactId, ConversationId};
use crate::types::messages::{Message, NewMessage};
use crate::types::options::Credential;

use super::ConversationApi;

/// REST client for the DoctorQ conversation backend
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its pool.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: String,
    credential: Credential,
}

#[derive(Serialize)]
struct CreateConversationBody<'a> {
    contact_id: &'a ContactId,
    channel: Channel,
}

#[derive(Serialize)]
struct TransferBody<'a> {
    target: &'a str,
}

impl RestClient {
    /// Create a client for the given API base URL
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(
        base: impl Into<String>,
        credential: Credential,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http,
            base: base.into(),
            credential,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base.trim_end_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(self.credential.as_str())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = self
            .http
            .post(self.url(path))
            .bearer_auth(self.credential.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InboxError::api(status.as_u16(), message));
        }
        Ok(response.json().await?)
    }
}

impl ConversationApi for RestClient {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.get_json("/conversations").await
    }

    async fn fetch_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        self.get_json(&format!("/conversations/{conversation}/messages"))
            .await
    }

    async fn send_message(
        &self,
        conversation: &ConversationId,
        message: &NewMessage,
    ) -> Result<Message> {
        self.post_json(
            &format!("/conversations/{conversation}/messages"),
            Some(message),
        )
        .await
    }

    async fn create_conversation(
        &self,
        contact: &ContactId,
        channel: Channel,
    ) -> Result<Conversation> {
        let body = CreateConversationBody {
            contact_id: contact,
            channel,
        };
        self.post_json("/conversations", Some(&body)).await
    }

    async fn close_conversation(&self, conversation: &ConversationId) -> Result<Conversation> {
        self.post_json::<_, ()>(&format!("/conversations/{conversation}/close"), None)
            .await
    }

    async fn transfer_conversation(
        &self,
        conversation: &ConversationId,
        target: &str,
    ) -> Result<Conversation> {
        let body = TransferBody { target };
        self.post_json(&format!("/conversations/{conversation}/transfer"), Some(&body))
            .await
    }

    async fn toggle_favorite(&self, conversation: &ConversationId) -> Result<Conversation> {
        self.post_json::<_, ()>(&format!("/conversations/{conversation}/favorite"), None)
            .await
    }

    async fn request_video_session(
        &self,
        conversation: &ConversationId,
    ) -> Result<VideoSession> {
        self.post_json::<_, ()>(&format!("/conversations/{conversation}/video"), None)
            .await
    }

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        self.post_json("/contacts", Some(contact)).await
    }

    async fn get_contact(&self, contact: &ContactId) -> Result<Contact> {
        self.get_json(&format!("/contacts/{}", contact.as_str())).await
    }

    async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>> {
        let response = self
            .http
            .get(self.url("/contacts"))
            .query(&[("query", query)])
            .bearer_auth(self.credential.as_str())
            .send()
            .await?;
        Self::decode(response).await
    }
}
