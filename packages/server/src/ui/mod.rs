//! UI 層（axum のルーティングとハンドラ）

pub mod auth;
mod handler;
mod server;
mod signal;
pub mod state;

use crate::domain::value_object::MAX_MEDIA_REF_BYTES;

pub use handler::http::ApiError;
pub use server::Server;

/// 受信する HTTP 本文・WebSocket メッセージの上限
///
/// 最大サイズのメディア参照に JSON の外枠分（1 MiB）を加えた値。
pub const MAX_INBOUND_BYTES: usize = MAX_MEDIA_REF_BYTES + 1024 * 1024;
