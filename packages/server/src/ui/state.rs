//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::MessagePusher,
    usecase::{
        ConnectSessionUseCase, DeleteMessageUseCase, DeleteNotificationUseCase,
        DisconnectSessionUseCase, GetMessagesUseCase, GetNotificationsUseCase, JoinChannelUseCase,
        MarkMessagesReadUseCase, NotifyDomainEventUseCase, SendMessageUseCase,
        UpdateNotificationUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// JoinChannelUseCase（チャンネル参加・離脱のユースケース）
    pub join_channel_usecase: Arc<JoinChannelUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// DeleteMessageUseCase（メッセージ削除のユースケース）
    pub delete_message_usecase: Arc<DeleteMessageUseCase>,
    /// MarkMessagesReadUseCase（既読処理のユースケース）
    pub mark_messages_read_usecase: Arc<MarkMessagesReadUseCase>,
    /// GetMessagesUseCase（メッセージ一覧取得のユースケース）
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
    /// GetNotificationsUseCase（通知一覧取得のユースケース）
    pub get_notifications_usecase: Arc<GetNotificationsUseCase>,
    /// UpdateNotificationUseCase（通知既読化のユースケース）
    pub update_notification_usecase: Arc<UpdateNotificationUseCase>,
    /// DeleteNotificationUseCase（通知削除のユースケース）
    pub delete_notification_usecase: Arc<DeleteNotificationUseCase>,
    /// NotifyDomainEventUseCase（ドメインイベント通知のユースケース）
    pub notify_domain_event_usecase: Arc<NotifyDomainEventUseCase>,
    /// MessagePusher（受信イベントの拒否を接続へ返すのに使う）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// 接続ごとの送信キューの容量
    pub outbound_buffer: usize,
}
