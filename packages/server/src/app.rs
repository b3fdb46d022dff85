//! Dependency wiring.
//!
//! Dependencies are created in order:
//! 1. Repositories and external collaborators
//! 2. Session Registry and MessagePusher
//! 3. UseCases
//! 4. AppState

use std::sync::Arc;

use teamroom_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    infrastructure::{
        directory::InMemoryDirectory,
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMessageRepository, InMemoryNotificationRepository},
        session::InMemorySessionRegistry,
    },
    ui::state::AppState,
    usecase::{
        ConnectSessionUseCase, DeleteMessageUseCase, DeleteNotificationUseCase,
        DisconnectSessionUseCase, GetMessagesUseCase, GetNotificationsUseCase, JoinChannelUseCase,
        MarkMessagesReadUseCase, MembershipGuard, MessageViewResolver, NotificationFanoutService,
        NotifyDomainEventUseCase, ReadReceiptTracker, SendMessageUseCase,
        UpdateNotificationUseCase,
    },
};

/// Build the shared state from configuration and the membership / user directory
pub fn build_app_state(config: &ServerConfig, directory: Arc<InMemoryDirectory>) -> Arc<AppState> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Repositories (in-memory database)
    let messages = Arc::new(InMemoryMessageRepository::with_clock(clock.clone()));
    let notifications = Arc::new(InMemoryNotificationRepository::with_clock(clock.clone()));

    // 2. Session Registry and MessagePusher (WebSocket implementation)
    let registry = Arc::new(InMemorySessionRegistry::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));

    // 3. UseCases
    let guard = Arc::new(MembershipGuard::new(
        directory.clone(),
        config.enforce_membership,
    ));
    let resolver = Arc::new(MessageViewResolver::new(directory.clone()));
    let fanout = Arc::new(NotificationFanoutService::new(
        notifications.clone(),
        message_pusher.clone(),
        config.fanout_concurrency,
        config.push_timeout(),
    ));
    let notify_domain_event_usecase = Arc::new(NotifyDomainEventUseCase::new(
        directory.clone(),
        directory,
        fanout,
    ));

    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock,
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let join_channel_usecase = Arc::new(JoinChannelUseCase::new(
        registry,
        message_pusher.clone(),
        guard.clone(),
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        messages.clone(),
        message_pusher.clone(),
        guard.clone(),
        resolver.clone(),
        notify_domain_event_usecase.clone(),
    ));
    let delete_message_usecase = Arc::new(DeleteMessageUseCase::new(
        messages.clone(),
        message_pusher.clone(),
    ));
    let mark_messages_read_usecase = Arc::new(MarkMessagesReadUseCase::new(
        messages.clone(),
        message_pusher.clone(),
        guard.clone(),
        Arc::new(ReadReceiptTracker::new(messages.clone())),
    ));
    let get_messages_usecase = Arc::new(GetMessagesUseCase::new(
        messages,
        guard,
        resolver,
        config.message_page_size,
    ));
    let get_notifications_usecase = Arc::new(GetNotificationsUseCase::new(
        notifications.clone(),
        config.notification_page_size,
    ));
    let update_notification_usecase =
        Arc::new(UpdateNotificationUseCase::new(notifications.clone()));
    let delete_notification_usecase = Arc::new(DeleteNotificationUseCase::new(notifications));

    // 4. AppState
    Arc::new(AppState {
        connect_session_usecase,
        disconnect_session_usecase,
        join_channel_usecase,
        send_message_usecase,
        delete_message_usecase,
        mark_messages_read_usecase,
        get_messages_usecase,
        get_notifications_usecase,
        update_notification_usecase,
        delete_notification_usecase,
        notify_domain_event_usecase,
        message_pusher,
        outbound_buffer: config.outbound_buffer.max(1),
    })
}
