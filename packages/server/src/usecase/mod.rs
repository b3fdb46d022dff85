//! UseCase 層
//!
//! ドメイン層の trait だけに依存し、UI 層（WebSocket / HTTP ハンドラ）から呼び出されます。

pub mod connect_session;
pub mod delete_message;
pub mod delete_notification;
pub mod disconnect_session;
pub mod error;
pub mod get_messages;
pub mod get_notifications;
pub mod join_channel;
pub mod mark_messages_read;
pub mod membership;
pub mod message_view;
pub mod notification_fanout;
pub mod notify_domain_event;
pub mod read_receipt;
pub mod send_message;
pub mod update_notification;

pub use connect_session::{ConnectSessionUseCase, ConnectedSession};
pub use delete_message::DeleteMessageUseCase;
pub use delete_notification::DeleteNotificationUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{
    ChannelError, DeleteMessageError, ErrorKind, MembershipError, MessageQueryError,
    NotificationError, NotifyError, SendMessageError, UseCaseError,
};
pub use get_messages::GetMessagesUseCase;
pub use get_notifications::GetNotificationsUseCase;
pub use join_channel::JoinChannelUseCase;
pub use mark_messages_read::MarkMessagesReadUseCase;
pub use membership::MembershipGuard;
pub use message_view::MessageViewResolver;
pub use notification_fanout::{FanoutReport, NotificationFanoutService};
pub use notify_domain_event::{FanoutDispatch, NotifyDomainEventUseCase};
pub use read_receipt::ReadReceiptTracker;
pub use send_message::{SendMessageUseCase, SentMessage};
pub use update_notification::UpdateNotificationUseCase;
