use serde::{Deserialize, Serialize};

/// Event types originated by this core.
pub mod event_type {
    pub const USER_STATUS_CHANGE: &str = "USER_STATUS_CHANGE";
    pub const INITIAL_STATUS: &str = "INITIAL_STATUS";

    // Domain-service event types. The core treats these opaquely and only
    // delivers them verbatim; the constants exist for callers and tests.
    pub const NEW_CONVERSATION: &str = "NEW_CONVERSATION";
    pub const CONVERSATION_NAME_UPDATED: &str = "CONVERSATION_NAME_UPDATED";
    pub const CONVERSATION_PICTURE_UPDATED: &str = "CONVERSATION_PICTURE_UPDATED";
    pub const CONVERSATION_USERS_ADDED: &str = "CONVERSATION_USERS_ADDED";
    pub const CONVERSATION_USERS_REMOVED: &str = "CONVERSATION_USERS_REMOVED";
    pub const NEW_MESSAGE: &str = "NEW_MESSAGE";
    pub const NEW_FRIEND_REQUEST: &str = "NEW_FRIEND_REQUEST";
    pub const FRIEND_REQUEST_ACCEPTED: &str = "FRIEND_REQUEST_ACCEPTED";
    pub const FRIEND_REQUEST_REJECTED: &str = "FRIEND_REQUEST_REJECTED";
}

/// Longest serialized event accepted at the HTTP ingress. The payload is
/// copied once per recipient connection, so it stays bounded.
pub const MAX_EVENT_BYTES: usize = 64 * 1024;

/// Presence status carried in `USER_STATUS_CHANGE` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceStatus {
    Online,
    Offline,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Offline => "offline",
        }
    }
}

/// The envelope pushed to clients: a tagged type plus an opaque data object.
/// Immutable once constructed; serialized identically to every recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    pub fn user_status_change(user_id: &str, status: PresenceStatus) -> Self {
        Self::new(
            event_type::USER_STATUS_CHANGE,
            serde_json::json!({
                "userId": user_id,
                "status": status.as_str(),
            }),
        )
    }

    pub fn initial_status(online_users: Vec<String>) -> Self {
        Self::new(
            event_type::INITIAL_STATUS,
            serde_json::json!({ "onlineUsers": online_users }),
        )
    }

    /// Serialized wire form. Built through a `Value` so serialization is
    /// infallible regardless of what callers put in `data`.
    pub fn to_payload(&self) -> String {
        serde_json::json!({
            "type": self.event_type,
            "data": self.data,
        })
        .to_string()
    }
}
