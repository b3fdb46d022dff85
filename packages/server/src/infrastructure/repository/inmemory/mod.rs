//! InMemory Repository 実装
//!
//! 永続化エンジンの代わりにプロセス内のデータ構造を使います。
//! データベース実装へ差し替える場合も UseCase 層は変更不要です。

mod message;
mod notification;

pub use message::InMemoryMessageRepository;
pub use notification::InMemoryNotificationRepository;
