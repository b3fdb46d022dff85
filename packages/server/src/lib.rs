//! Teamroom real-time messaging and notification server.
//!
//! レイヤー構成:
//!
//! - `domain`: Entity・Value Object と、Repository / MessagePusher などの trait
//! - `infrastructure`: trait のインメモリ実装と WebSocket 配信、DTO
//! - `usecase`: メッセージ送信・既読・通知ファンアウトなどのユースケース
//! - `ui`: axum のルーティングと HTTP / WebSocket ハンドラ

pub mod app;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
