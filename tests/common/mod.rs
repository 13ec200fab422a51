//! Shared test doubles: a recording transport factory and an in-memory
//! conversation API

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use doctorq_inbox::{
    Channel, Contact, ContactId, Conversation, ConversationApi, ConversationId, Credential,
    DeliveryStatus, Direction, Frame, InboxError, Message, MessageId, MessageKind, NewContact,
    NewMessage, ParticipantRole, Result, Transport, TransportFactory, VideoSession,
};

// ============================================================================
// Mock transport
// ============================================================================

/// Observable transport lifecycle event, in the order it happened
#[derive(Debug, Clone)]
pub enum MockEvent {
    Created(ConversationId),
    Connected(ConversationId),
    Sent(ConversationId, Frame),
    Closed(ConversationId),
}

pub struct MockState {
    /// Number of upcoming connect attempts that fail
    pub connect_failures: u32,
    /// Everything every transport did, in order
    pub events: Vec<MockEvent>,
    /// Frame injectors for transports created so far, oldest first
    pub injectors: Vec<(ConversationId, mpsc::UnboundedSender<Result<Frame>>)>,
}

/// Transport factory recording every lifecycle event into shared state
#[derive(Clone)]
pub struct MockFactory {
    state: Arc<Mutex<MockState>>,
}

impl MockFactory {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            state: Arc::new(Mutex::new(MockState {
                connect_failures: 0,
                events: Vec::new(),
                injectors: Vec::new(),
            })),
        }
    }

    /// Factory whose next `failures` connect attempts fail
    pub fn failing(failures: u32) -> Self {
        let factory = Self::new();
        factory.state.lock().connect_failures = failures;
        factory
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.state.lock().events.clone()
    }

    /// Frames sent on links for the given conversation
    pub fn sent_frames(&self, conversation: &ConversationId) -> Vec<Frame> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                MockEvent::Sent(id, frame) if id == conversation => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    /// Deliver an inbound frame on the most recent link for a conversation
    pub fn inject(&self, conversation: &ConversationId, frame: Frame) {
        let state = self.state.lock();
        let injector = state
            .injectors
            .iter()
            .rev()
            .find(|(id, _)| id == conversation)
            .map(|(_, tx)| tx.clone());
        drop(state);
        injector
            .unwrap_or_else(|| panic!("no link exists for {conversation}"))
            .send(Ok(frame))
            .ok();
    }

    /// Simulate the socket stream ending, forcing a reconnect
    pub fn break_stream(&self, conversation: &ConversationId) {
        let mut state = self.state.lock();
        if let Some(position) = state
            .injectors
            .iter()
            .rposition(|(id, _)| id == conversation)
        {
            state.injectors.remove(position);
        }
    }

    pub fn set_connect_failures(&self, failures: u32) {
        self.state.lock().connect_failures = failures;
    }
}

impl TransportFactory for MockFactory {
    type Transport = MockTransport;

    fn create(
        &self,
        conversation: &ConversationId,
        _role: ParticipantRole,
        _credential: &Credential,
    ) -> Result<Self::Transport> {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        state.events.push(MockEvent::Created(conversation.clone()));
        state.injectors.push((conversation.clone(), frame_tx));
        Ok(MockTransport {
            conversation: conversation.clone(),
            state: Arc::clone(&self.state),
            frame_rx: Some(frame_rx),
            ready: false,
        })
    }
}

pub struct MockTransport {
    conversation: ConversationId,
    state: Arc<Mutex<MockState>>,
    frame_rx: Option<mpsc::UnboundedReceiver<Result<Frame>>>,
    ready: bool,
}

impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.connect_failures > 0 {
            state.connect_failures -= 1;
            return Err(InboxError::connection("mock connect refused"));
        }
        state
            .events
            .push(MockEvent::Connected(self.conversation.clone()));
        drop(state);
        self.ready = true;
        Ok(())
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        if !self.ready {
            return Err(InboxError::transport("mock transport not connected"));
        }
        self.state
            .lock()
            .events
            .push(MockEvent::Sent(self.conversation.clone(), frame.clone()));
        Ok(())
    }

    fn read_frames(&mut self) -> mpsc::UnboundedReceiver<Result<Frame>> {
        self.frame_rx
            .take()
            .unwrap_or_else(|| mpsc::unbounded_channel().1)
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn close(&mut self) -> Result<()> {
        self.ready = false;
        self.state
            .lock()
            .events
            .push(MockEvent::Closed(self.conversation.clone()));
        Ok(())
    }
}

// ============================================================================
// Mock conversation API
// ============================================================================

pub struct ApiState {
    pub conversations: Vec<Conversation>,
    pub messages: HashMap<ConversationId, Vec<Message>>,
    /// Artificial latency per conversation, applied to `fetch_messages`
    pub fetch_delays: HashMap<ConversationId, Duration>,
    /// Number of upcoming `fetch_messages` calls that fail
    pub fetch_failures: u32,
    /// Whether `send_message` fails
    pub fail_sends: bool,
    /// Messages the session asked the backend to create
    pub sent: Vec<(ConversationId, NewMessage)>,
}

/// In-memory conversation backend
#[derive(Clone)]
pub struct MockApi {
    state: Arc<Mutex<ApiState>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ApiState {
                conversations: Vec::new(),
                messages: HashMap::new(),
                fetch_delays: HashMap::new(),
                fetch_failures: 0,
                fail_sends: false,
                sent: Vec::new(),
            })),
        }
    }

    pub fn with_messages(conversation: &ConversationId, messages: Vec<Message>) -> Self {
        let api = Self::new();
        api.state
            .lock()
            .messages
            .insert(conversation.clone(), messages);
        api
    }

    pub fn put_messages(&self, conversation: &ConversationId, messages: Vec<Message>) {
        self.state
            .lock()
            .messages
            .insert(conversation.clone(), messages);
    }

    pub fn put_conversations(&self, conversations: Vec<Conversation>) {
        self.state.lock().conversations = conversations;
    }

    pub fn set_fetch_delay(&self, conversation: &ConversationId, delay: Duration) {
        self.state
            .lock()
            .fetch_delays
            .insert(conversation.clone(), delay);
    }

    pub fn set_fetch_failures(&self, failures: u32) {
        self.state.lock().fetch_failures = failures;
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.state.lock().fail_sends = fail;
    }

    pub fn sent(&self) -> Vec<(ConversationId, NewMessage)> {
        self.state.lock().sent.clone()
    }
}

impl ConversationApi for MockApi {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        Ok(self.state.lock().conversations.clone())
    }

    async fn fetch_messages(&self, conversation: &ConversationId) -> Result<Vec<Message>> {
        let delay = self.state.lock().fetch_delays.get(conversation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.fetch_failures > 0 {
            state.fetch_failures -= 1;
            return Err(InboxError::api(503, "mock fetch unavailable"));
        }
        Ok(state
            .messages
            .get(conversation)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(
        &self,
        conversation: &ConversationId,
        message: &NewMessage,
    ) -> Result<Message> {
        let mut state = self.state.lock();
        if state.fail_sends {
            return Err(InboxError::api(500, "mock send rejected"));
        }
        let created = Message {
            id: MessageId::random(),
            direction: Direction::Outbound,
            kind: message.kind,
            content: message.content.clone(),
            created_at: Utc::now(),
            status: DeliveryStatus::Sent,
        };
        state
            .messages
            .entry(conversation.clone())
            .or_default()
            .push(created.clone());
        state.sent.push((conversation.clone(), message.clone()));
        Ok(created)
    }

    async fn create_conversation(
        &self,
        contact: &ContactId,
        channel: Channel,
    ) -> Result<Conversation> {
        let conversation = Conversation {
            id: ConversationId::new(format!("conv-{contact}", contact = contact.as_str())),
            contact_id: contact.clone(),
            channel,
            open: true,
            bot_active: false,
            awaiting_human: false,
            favorite: false,
            last_message_at: None,
            message_count: 0,
            inbound_count: 0,
        };
        self.state
            .lock()
            .conversations
            .push(conversation.clone());
        Ok(conversation)
    }

    async fn close_conversation(&self, conversation: &ConversationId) -> Result<Conversation> {
        let mut state = self.state.lock();
        let found = state
            .conversations
            .iter_mut()
            .find(|c| &c.id == conversation)
            .ok_or_else(|| InboxError::api(404, "no such conversation"))?;
        found.open = false;
        Ok(found.clone())
    }

    async fn transfer_conversation(
        &self,
        conversation: &ConversationId,
        _target: &str,
    ) -> Result<Conversation> {
        let state = self.state.lock();
        state
            .conversations
            .iter()
            .find(|c| &c.id == conversation)
            .cloned()
            .ok_or_else(|| InboxError::api(404, "no such conversation"))
    }

    async fn toggle_favorite(&self, conversation: &ConversationId) -> Result<Conversation> {
        let mut state = self.state.lock();
        let found = state
            .conversations
            .iter_mut()
            .find(|c| &c.id == conversation)
            .ok_or_else(|| InboxError::api(404, "no such conversation"))?;
        found.favorite = !found.favorite;
        Ok(found.clone())
    }

    async fn request_video_session(&self, conversation: &ConversationId) -> Result<VideoSession> {
        Ok(VideoSession {
            url: format!("https://video.example/{conversation}"),
        })
    }

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        Ok(Contact {
            id: ContactId::new(format!("contact-{}", contact.name)),
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
        })
    }

    async fn get_contact(&self, contact: &ContactId) -> Result<Contact> {
        Ok(Contact {
            id: contact.clone(),
            name: "Test Contact".to_string(),
            phone: None,
            email: None,
        })
    }

    async fn search_contacts(&self, _query: &str) -> Result<Vec<Contact>> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Fixture helpers
// ============================================================================

/// Deterministic base timestamp for fixtures
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// Message fixture offset `seconds` from the base timestamp
pub fn message(id: &str, direction: Direction, seconds: i64) -> Message {
    Message {
        id: MessageId::new(id),
        direction,
        kind: MessageKind::Text,
        content: format!("content of {id}"),
        created_at: base_time() + chrono::Duration::seconds(seconds),
        status: DeliveryStatus::Sent,
    }
}

/// Conversation summary fixture
pub fn conversation(id: &str, channel: Channel, open: bool) -> Conversation {
    Conversation {
        id: ConversationId::new(id),
        contact_id: ContactId::new(format!("contact-{id}")),
        channel,
        open,
        bot_active: false,
        awaiting_human: false,
        favorite: false,
        last_message_at: None,
        message_count: 0,
        inbound_count: 0,
    }
}

/// Inbound message frame fixture
pub fn message_frame(message: Message) -> Frame {
    Frame::Message { message }
}

/// Peer typing frame fixture
pub fn typing_frame(participant: &str, display_name: Option<&str>, started: bool) -> Frame {
    Frame::Typing {
        participant: Some(doctorq_inbox::ParticipantId::new(participant)),
        display_name: display_name.map(str::to_string),
        started,
    }
}

/// Yield a few times so freshly-spawned tasks get to register their timers
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
