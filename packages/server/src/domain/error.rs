//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object 生成時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    #[error("{kind} must be at most {max} characters")]
    IdTooLong { kind: &'static str, max: usize },

    #[error("'{0}' is not a valid id")]
    InvalidUuid(String),

    #[error("'{0}' is not a valid channel (expected user:<id> or project:<id>)")]
    InvalidChannel(String),

    #[error("message must carry text, an image or a video")]
    EmptyContent,

    #[error("message text must be at most {max} characters")]
    TextTooLong { max: usize },

    #[error("media reference must be at most {max} bytes")]
    MediaTooLarge { max: usize },

    #[error("a message carries at most one media attachment")]
    MultipleMedia,

    #[error("notification message must not be empty")]
    EmptyNotificationText,

    #[error("notification message must be at most {max} characters")]
    NotificationTextTooLong { max: usize },
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("message '{0}' not found")]
    MessageNotFound(String),

    #[error("notification '{0}' not found")]
    NotificationNotFound(String),

    /// 操作対象の所有者（送信者・受信者）ではない
    #[error("'{requester}' does not own {resource}")]
    NotOwner { requester: String, resource: String },

    /// 永続化層が利用できない（一時的な障害）
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// メッセージ送信（プッシュ）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// セッションレジストリのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("connection '{0}' is not registered")]
    UnknownConnection(String),
}

/// 外部プロバイダ（メンバーシップ・ユーザーディレクトリ）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}
