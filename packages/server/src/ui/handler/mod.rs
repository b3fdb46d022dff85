//! HTTP / WebSocket handlers.

pub mod http;
pub mod websocket;

pub use http::{
    delete_message, delete_notification, health_check, list_messages, list_notifications,
    mark_all_notifications_read, mark_messages_read, mark_notification_read, post_event,
    send_message,
};
pub use websocket::websocket_handler;
