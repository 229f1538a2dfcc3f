//! WebSocket Message Types
//!
//! Every frame in both directions is `{"event": <name>, "data": <payload>}`.
//! Inbound payloads are deserialized and validated before they reach a
//! handler; anything that fails becomes a [`PayloadError`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::connection::OutboundFrame;
use crate::domain::{ConversationId, EphemeralMessage, UserId};
use crate::shared::validation;

/// Event names used on the wire
pub mod events {
    pub const NEW_MESSAGE: &str = "new-message";
    pub const NEW_MESSAGE_ALERT: &str = "new-message-alert";
    pub const TYPING_START: &str = "typing-start";
    pub const TYPING_STOP: &str = "typing-stop";
    pub const CONVERSATION_JOINED: &str = "conversation-joined";
    pub const CONVERSATION_LEFT: &str = "conversation-left";
    pub const ONLINE_USERS: &str = "online-users";
    pub const MESSAGE_PERSIST_FAILED: &str = "message-persist-failed";
    pub const ERROR: &str = "error";

    /// Names only the gateway itself may send.
    pub const RESERVED: &[&str] = &[
        NEW_MESSAGE,
        NEW_MESSAGE_ALERT,
        TYPING_START,
        TYPING_STOP,
        CONVERSATION_JOINED,
        CONVERSATION_LEFT,
        ONLINE_USERS,
        MESSAGE_PERSIST_FAILED,
        ERROR,
    ];

    pub fn is_reserved(name: &str) -> bool {
        RESERVED.contains(&name)
    }
}

/// Longest accepted message body, in characters
pub const MAX_CONTENT_LENGTH: usize = 4000;

/// Rejected inbound frame. The connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Invalid {event} payload: {reason}")]
    InvalidPayload { event: String, reason: String },

    #[error("userId does not match the authenticated user")]
    IdentityMismatch,
}

impl PayloadError {
    /// Stable machine-readable code sent to the client and used as a metric label.
    pub fn code(&self) -> &'static str {
        match self {
            PayloadError::MalformedFrame(_) => "malformed-frame",
            PayloadError::UnknownEvent(_) => "unknown-event",
            PayloadError::InvalidPayload { .. } => "invalid-payload",
            PayloadError::IdentityMismatch => "identity-mismatch",
        }
    }
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// `new-message` payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMessagePayload {
    #[serde(alias = "chatId")]
    pub conversation_id: ConversationId,

    #[validate(length(min = 1, message = "must name at least one member"))]
    pub members: Vec<UserId>,

    #[serde(alias = "message")]
    #[validate(length(min = 1, max = 4000, message = "must be 1-4000 characters"))]
    pub content: String,
}

/// `typing-start` / `typing-stop` payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    #[serde(alias = "chatId")]
    pub conversation_id: ConversationId,

    #[validate(length(min = 1, message = "must name at least one member"))]
    pub members: Vec<UserId>,
}

/// `conversation-joined` / `conversation-left` payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPayload {
    pub user_id: UserId,

    #[validate(length(min = 1, message = "must name at least one member"))]
    pub members: Vec<UserId>,
}

/// Validated inbound event
#[derive(Debug, Clone)]
pub enum ClientEvent {
    NewMessage(NewMessagePayload),
    TypingStart(TypingPayload),
    TypingStop(TypingPayload),
    ConversationJoined(MembershipPayload),
    ConversationLeft(MembershipPayload),
}

impl ClientEvent {
    /// Parse and validate one text frame.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let frame: InboundFrame = serde_json::from_str(text)
            .map_err(|e| PayloadError::MalformedFrame(e.to_string()))?;

        match frame.event.as_str() {
            events::NEW_MESSAGE => payload(frame).map(ClientEvent::NewMessage),
            events::TYPING_START => payload(frame).map(ClientEvent::TypingStart),
            events::TYPING_STOP => payload(frame).map(ClientEvent::TypingStop),
            events::CONVERSATION_JOINED => payload(frame).map(ClientEvent::ConversationJoined),
            events::CONVERSATION_LEFT => payload(frame).map(ClientEvent::ConversationLeft),
            _ => Err(PayloadError::UnknownEvent(frame.event)),
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            ClientEvent::NewMessage(_) => events::NEW_MESSAGE,
            ClientEvent::TypingStart(_) => events::TYPING_START,
            ClientEvent::TypingStop(_) => events::TYPING_STOP,
            ClientEvent::ConversationJoined(_) => events::CONVERSATION_JOINED,
            ClientEvent::ConversationLeft(_) => events::CONVERSATION_LEFT,
        }
    }
}

fn payload<T>(frame: InboundFrame) -> Result<T, PayloadError>
where
    T: DeserializeOwned + Validate,
{
    let InboundFrame { event, data } = frame;
    let parsed: T = serde_json::from_value(data).map_err(|e| PayloadError::InvalidPayload {
        event: event.clone(),
        reason: e.to_string(),
    })?;
    parsed
        .validate()
        .map_err(|errors| PayloadError::InvalidPayload {
            event,
            reason: validation::describe(&errors),
        })?;
    Ok(parsed)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub conversation_id: ConversationId,
    pub message: EphemeralMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEvent {
    pub conversation_id: ConversationId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistFailedEvent {
    pub conversation_id: ConversationId,
    pub message_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}

/// Outbound event
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    NewMessage(NewMessageEvent),
    NewMessageAlert(ConversationEvent),
    TypingStart(ConversationEvent),
    TypingStop(ConversationEvent),
    OnlineUsers(Vec<UserId>),
    MessagePersistFailed(PersistFailedEvent),
    Error(ErrorEvent),
}

impl ServerEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::NewMessage(_) => events::NEW_MESSAGE,
            ServerEvent::NewMessageAlert(_) => events::NEW_MESSAGE_ALERT,
            ServerEvent::TypingStart(_) => events::TYPING_START,
            ServerEvent::TypingStop(_) => events::TYPING_STOP,
            ServerEvent::OnlineUsers(_) => events::ONLINE_USERS,
            ServerEvent::MessagePersistFailed(_) => events::MESSAGE_PERSIST_FAILED,
            ServerEvent::Error(_) => events::ERROR,
        }
    }

    pub fn to_json(&self) -> Value {
        let value = match self {
            ServerEvent::NewMessage(e) => serde_json::to_value(e),
            ServerEvent::NewMessageAlert(e) => serde_json::to_value(e),
            ServerEvent::TypingStart(e) => serde_json::to_value(e),
            ServerEvent::TypingStop(e) => serde_json::to_value(e),
            ServerEvent::OnlineUsers(users) => serde_json::to_value(users),
            ServerEvent::MessagePersistFailed(e) => serde_json::to_value(e),
            ServerEvent::Error(e) => serde_json::to_value(e),
        };
        value.unwrap_or_default()
    }

    pub fn to_frame(&self) -> OutboundFrame {
        OutboundFrame::new(self.event_name(), self.to_json())
    }

    pub fn typing(started: bool, conversation_id: ConversationId) -> Self {
        let event = ConversationEvent { conversation_id };
        if started {
            ServerEvent::TypingStart(event)
        } else {
            ServerEvent::TypingStop(event)
        }
    }
}

impl From<&PayloadError> for ServerEvent {
    fn from(err: &PayloadError) -> Self {
        ServerEvent::Error(ErrorEvent {
            code: err.code().to_string(),
            message: err.to_string(),
        })
    }
}
