//! Chat session store
//!
//! A [`Session`] is an ordered, append-only log of [`Message`]s plus the
//! conversation flags the flow controller reads and writes. Messages are
//! never removed, with one exception: a still-streaming assistant
//! placeholder may be substituted by an error message when its reply fails.
//!
//! State changes are published as [`SessionEvent`]s on a broadcast channel;
//! callers that render the conversation subscribe instead of polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::details::IdentityDetails;
use super::doctors::Doctor;
use super::message::{Affordance, Author, Message, MessageId};
use crate::error::{Result, ShipsmartError};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 64;

/// Named position in the scripted conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// No user message accepted yet
    Fresh,
    /// Identity fields were requested and are being collected
    AwaitingIdentity,
    /// Collected identity fields were echoed back with yes/no
    ConfirmingIdentity,
    /// No scripted sub-flow in progress
    Idle,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::AwaitingIdentity => write!(f, "awaiting identity"),
            Self::ConfirmingIdentity => write!(f, "confirming identity"),
            Self::Idle => write!(f, "idle"),
        }
    }
}

/// Doctor booking waiting for a yes/no answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub doctor: Doctor,
    pub requested_at: DateTime<Utc>,
}

/// Confirmed booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub doctor: Doctor,
    pub confirmed_at: DateTime<Utc>,
}

/// Notification published whenever the session changes
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A committed or placeholder message was added at the end
    MessageAppended(MessageId),
    /// Streamed text was added to a placeholder
    MessageUpdated(MessageId),
    /// A placeholder finished streaming and is now frozen
    StreamFinished(MessageId),
    /// A failed placeholder was replaced by an error message
    PlaceholderReplaced {
        removed: MessageId,
        replacement: MessageId,
    },
    /// The named conversation state moved
    StateChanged(ConversationState),
    /// A reply started (true) or completed (false)
    ReplyPending(bool),
}

/// One continuous conversation
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
    turn_count: usize,
    has_shown_insurance_info: bool,
    pending_confirmation: Option<PendingConfirmation>,
    state: ConversationState,
    identity: IdentityDetails,
    appointments: Vec<Appointment>,
    awaiting_reply: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session
    ///
    /// Use [`crate::chat::FlowController::open_session`] to get one that
    /// starts with the assistant's welcome message.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let id = Uuid::new_v4();
        tracing::debug!("Created chat session {}", id);
        Self {
            id,
            created_at: Utc::now(),
            messages: Vec::new(),
            turn_count: 0,
            has_shown_insurance_info: false,
            pending_confirmation: None,
            state: ConversationState::Fresh,
            identity: IdentityDetails::default(),
            appointments: Vec::new(),
            awaiting_reply: false,
            events,
        }
    }

    /// Subscribe to change notifications
    ///
    /// # Examples
    ///
    /// ```
    /// use shipsmart::chat::{FlowController, SessionEvent};
    ///
    /// let controller = FlowController::offline();
    /// let mut session = shipsmart::chat::Session::new();
    /// let mut events = session.subscribe();
    /// controller.greet(&mut session);
    /// assert!(matches!(events.try_recv(), Ok(SessionEvent::MessageAppended(_))));
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    /// Number of user messages that passed validation
    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn has_shown_insurance_info(&self) -> bool {
        self.has_shown_insurance_info
    }

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending_confirmation.as_ref()
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn identity(&self) -> &IdentityDetails {
        &self.identity
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// True while a reply is being produced; input should be disabled
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Most recent assistant message, if any
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| !m.is_user())
    }

    /// Message currently holding the streaming flag
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.is_streaming())
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.messages.last() {
            Some(last) if last.timestamp() > now => last.timestamp(),
            _ => now,
        }
    }

    fn append(&mut self, message: Message) -> MessageId {
        let id = message.id();
        self.messages.push(message);
        self.publish(SessionEvent::MessageAppended(id));
        id
    }

    pub(crate) fn push_user(&mut self, content: &str) -> MessageId {
        let message = Message::new(Author::User, content, self.next_timestamp());
        self.append(message)
    }

    pub(crate) fn push_assistant(
        &mut self,
        content: impl Into<String>,
        controls: Option<Affordance>,
    ) -> MessageId {
        let message =
            Message::new(Author::Assistant, content, self.next_timestamp()).with_controls(controls);
        self.append(message)
    }

    pub(crate) fn push_error(&mut self, content: impl Into<String>) -> MessageId {
        let message = Message::error(content, self.next_timestamp());
        self.append(message)
    }

    /// Append an empty streaming placeholder
    ///
    /// # Errors
    ///
    /// Returns `ShipsmartError::Session` if another message is still streaming
    pub(crate) fn begin_streaming(&mut self) -> Result<MessageId> {
        if let Some(active) = self.streaming_message() {
            return Err(ShipsmartError::Session(format!(
                "message {} is already streaming",
                active.id()
            ))
            .into());
        }
        let message = Message::placeholder(self.next_timestamp());
        Ok(self.append(message))
    }

    fn streaming_index(&self, id: MessageId) -> Result<usize> {
        self.messages
            .iter()
            .position(|m| m.id() == id && m.is_streaming())
            .ok_or_else(|| {
                ShipsmartError::Session(format!("message {} is not streaming", id)).into()
            })
    }

    pub(crate) fn append_stream(&mut self, id: MessageId, chunk: &str) -> Result<()> {
        let index = self.streaming_index(id)?;
        self.messages[index].push_content(chunk)?;
        self.publish(SessionEvent::MessageUpdated(id));
        Ok(())
    }

    pub(crate) fn finish_streaming(&mut self, id: MessageId) -> Result<()> {
        let index = self.streaming_index(id)?;
        self.messages[index].finish_streaming();
        self.publish(SessionEvent::StreamFinished(id));
        Ok(())
    }

    /// Replace a streaming placeholder with an error message
    ///
    /// The placeholder is the only message that can be removed from a
    /// session; committed content is never touched.
    pub(crate) fn fail_streaming(
        &mut self,
        id: MessageId,
        content: impl Into<String>,
    ) -> Result<MessageId> {
        let index = self.streaming_index(id)?;
        self.messages.remove(index);
        let replacement = Message::error(content, self.next_timestamp());
        let replacement_id = replacement.id();
        self.messages.push(replacement);
        self.publish(SessionEvent::PlaceholderReplaced {
            removed: id,
            replacement: replacement_id,
        });
        Ok(replacement_id)
    }

    pub(crate) fn record_turn(&mut self) {
        self.turn_count += 1;
    }

    pub(crate) fn mark_insurance_info_shown(&mut self) {
        self.has_shown_insurance_info = true;
    }

    pub(crate) fn set_pending_confirmation(&mut self, doctor: Doctor) {
        self.pending_confirmation = Some(PendingConfirmation {
            doctor,
            requested_at: Utc::now(),
        });
    }

    pub(crate) fn take_pending_confirmation(&mut self) -> Option<PendingConfirmation> {
        self.pending_confirmation.take()
    }

    pub(crate) fn set_state(&mut self, state: ConversationState) {
        if self.state != state {
            tracing::debug!("Session {}: {} -> {}", self.id, self.state, state);
            self.state = state;
            self.publish(SessionEvent::StateChanged(state));
        }
    }

    pub(crate) fn identity_mut(&mut self) -> &mut IdentityDetails {
        &mut self.identity
    }

    pub(crate) fn record_appointment(&mut self, doctor: Doctor) -> &Appointment {
        self.appointments.push(Appointment {
            doctor,
            confirmed_at: Utc::now(),
        });
        &self.appointments[self.appointments.len() - 1]
    }

    pub(crate) fn set_awaiting_reply(&mut self, awaiting: bool) {
        if self.awaiting_reply != awaiting {
            self.awaiting_reply = awaiting;
            self.publish(SessionEvent::ReplyPending(awaiting));
        }
    }
}
