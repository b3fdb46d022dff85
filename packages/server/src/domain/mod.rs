//! ドメイン層
//!
//! Entity・Value Object・イベントと、Infrastructure 層が実装する trait を定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod provider;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    MembershipSnapshot, Message, MessageView, NewNotification, Notification, NotificationTemplate,
    ProjectMember, ProjectRole, Session, UserProfile,
};
pub use error::{
    MessagePushError, ProviderError, RepositoryError, SessionError, ValueObjectError,
};
pub use event::{DomainEvent, RoomEvent};
pub use provider::{MembershipProvider, UserDirectory};
pub use pusher::{MessagePusher, PublishReport, PusherChannel, SessionRegistry};
pub use repository::{MessageRepository, NotificationRepository, ReadReceiptUpdate};
pub use value_object::{
    ChannelId, ConnectionId, MediaKind, MediaRef, MessageContent, MessageId, MessageText,
    NotificationId, NotificationKind, NotificationText, ProjectId, Timestamp, UserId,
};
