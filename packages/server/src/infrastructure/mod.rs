//! Infrastructure 層
//!
//! ドメイン層の trait に対する具体的な実装（インメモリストア、WebSocket 配信など）。

pub mod directory;
pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod session;
