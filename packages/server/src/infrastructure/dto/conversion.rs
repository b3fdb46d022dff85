//! Conversion logic from domain entities to DTOs.

use teamroom_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    entity::{MessageView, Notification, UserProfile},
    event::RoomEvent,
    value_object::MediaKind,
};
use crate::infrastructure::dto::{
    resource::{MessageDto, NotificationDto, UserDto},
    websocket::{ErrorDto, MessagesReadDto, ServerEvent},
};

impl From<&UserProfile> for UserDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            username: profile.username.clone(),
        }
    }
}

impl From<&MessageView> for MessageDto {
    fn from(view: &MessageView) -> Self {
        let message = &view.message;
        let media = message.content.media();
        let media_of = |kind: MediaKind| {
            media
                .filter(|m| m.kind() == kind)
                .map(|m| m.location().to_string())
        };

        Self {
            id: message.id.to_string(),
            project_id: message.project_id.to_string(),
            sender: UserDto::from(&view.sender),
            text: message.content.text().map(str::to_string),
            image: media_of(MediaKind::Image),
            video: media_of(MediaKind::Video),
            read_by: view.read_by.iter().map(UserDto::from).collect(),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
        }
    }
}

impl From<&Notification> for NotificationDto {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            message: notification.message.as_str().to_string(),
            kind: notification.kind,
            read: notification.read,
            link: notification.link.clone(),
            created_at: timestamp_to_rfc3339(notification.created_at.value()),
        }
    }
}

impl From<&RoomEvent> for ServerEvent {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::MessageReceived(view) => Self::ReceiveMessage(view.into()),
            RoomEvent::MessageDeleted { message_id } => Self::MessageDeleted(message_id.to_string()),
            RoomEvent::MessagesRead {
                reader_id,
                message_ids,
            } => Self::MessagesRead(MessagesReadDto {
                user_id: reader_id.to_string(),
                message_ids: message_ids.iter().map(ToString::to_string).collect(),
            }),
            RoomEvent::NotificationCreated(notification) => {
                Self::NewNotification(notification.into())
            }
            RoomEvent::ChannelJoined(channel) => Self::Joined(channel.to_string()),
            RoomEvent::ChannelLeft(channel) => Self::Left(channel.to_string()),
            RoomEvent::Rejected { code, message } => Self::Error(ErrorDto {
                code: code.clone(),
                message: message.clone(),
            }),
        }
    }
}
