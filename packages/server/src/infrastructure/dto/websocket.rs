//! WebSocket event DTOs.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use super::resource::{MessageDto, NotificationDto};

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Subscribe to the personal channel `user:{id}`
    JoinUser(String),
    /// Subscribe to the project channel `project:{id}`
    JoinProject(String),
    /// Unsubscribe from the project channel `project:{id}`
    LeaveProject(String),
    SendMessage(SendMessagePayload),
    DeleteMessage(DeleteMessagePayload),
    MarkRead(MarkReadPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub project_id: String,
    /// Must match the authenticated user when present
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessagePayload {
    #[serde(default)]
    pub project_id: Option<String>,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    #[serde(default)]
    pub project_id: Option<String>,
    /// Must match the authenticated user when present
    #[serde(default)]
    pub user_id: Option<String>,
    pub message_ids: Vec<String>,
}

/// Events sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage(MessageDto),
    /// Tombstone: id of the deleted message
    MessageDeleted(String),
    MessagesRead(MessagesReadDto),
    NewNotification(NotificationDto),
    /// Acknowledges a join with the channel's text form
    Joined(String),
    Left(String),
    Error(ErrorDto),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesReadDto {
    pub user_id: String,
    pub message_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub code: String,
    pub message: String,
}
