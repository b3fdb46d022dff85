//! UseCase 層のエラー定義
//!
//! 各エラーは [`ErrorKind`] に分類され、UI 層はこの分類で HTTP ステータスや
//! WebSocket のエラーコードを決めます。

use thiserror::Error;

use crate::domain::{ProviderError, RepositoryError, SessionError, ValueObjectError};

/// エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 入力が不正（永続化の副作用なし）
    Validation,
    /// 権限が無い（変更なし）
    Authorization,
    /// 対象が存在しない
    NotFound,
    /// 永続化層・外部プロバイダの一時的な障害
    Transient,
}

/// UseCase のエラーが共通で持つ分類
pub trait UseCaseError: std::error::Error {
    fn kind(&self) -> ErrorKind;
}

fn store_kind(error: &RepositoryError) -> ErrorKind {
    match error {
        RepositoryError::MessageNotFound(_) | RepositoryError::NotificationNotFound(_) => {
            ErrorKind::NotFound
        }
        RepositoryError::NotOwner { .. } => ErrorKind::Authorization,
        RepositoryError::Unavailable(_) => ErrorKind::Transient,
    }
}

/// メンバーシップ確認のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    #[error("'{user}' is not a member of project '{project}'")]
    NotMember { user: String, project: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl UseCaseError for MembershipError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotMember { .. } => ErrorKind::Authorization,
            Self::Provider(_) => ErrorKind::Transient,
        }
    }
}

/// チャンネル参加・離脱のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("a connection may only join its own personal channel")]
    ForeignPersonalChannel,

    #[error(transparent)]
    Membership(#[from] MembershipError),
}

impl UseCaseError for ChannelError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(_) => ErrorKind::NotFound,
            Self::ForeignPersonalChannel => ErrorKind::Authorization,
            Self::Membership(e) => e.kind(),
        }
    }
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl UseCaseError for SendMessageError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Membership(e) => e.kind(),
            Self::Store(e) => store_kind(e),
        }
    }
}

/// メッセージ削除のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteMessageError {
    #[error("message '{0}' not found")]
    NotFound(String),

    #[error("only the sender may delete message '{0}'")]
    NotSender(String),

    #[error(transparent)]
    Store(RepositoryError),
}

impl From<RepositoryError> for DeleteMessageError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::MessageNotFound(id) => Self::NotFound(id),
            RepositoryError::NotOwner { resource, .. } => Self::NotSender(resource),
            other => Self::Store(other),
        }
    }
}

impl UseCaseError for DeleteMessageError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotSender(_) => ErrorKind::Authorization,
            Self::Store(e) => store_kind(e),
        }
    }
}

/// 既読処理・メッセージ取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageQueryError {
    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl UseCaseError for MessageQueryError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Membership(e) => e.kind(),
            Self::Store(e) => store_kind(e),
        }
    }
}

/// 通知の取得・更新・削除のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl UseCaseError for NotificationError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => store_kind(e),
        }
    }
}

/// ドメインイベントによる通知のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("project '{0}' is unknown to the membership provider")]
    UnknownProject(String),

    #[error("invalid notification: {0}")]
    InvalidNotification(#[from] ValueObjectError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl UseCaseError for NotifyError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownProject(_) => ErrorKind::NotFound,
            Self::InvalidNotification(_) => ErrorKind::Validation,
            Self::Provider(_) => ErrorKind::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_error_from_repository_error() {
        // テスト項目: Repository のエラーが削除エラーの分類に変換される
        // given (前提条件):
        let not_owner = RepositoryError::NotOwner {
            requester: "bob".to_string(),
            resource: "message 'm1'".to_string(),
        };
        let missing = RepositoryError::MessageNotFound("m2".to_string());
        let down = RepositoryError::Unavailable("timeout".to_string());

        // when (操作):
        let kinds: Vec<ErrorKind> = [not_owner, missing, down]
            .into_iter()
            .map(|e| DeleteMessageError::from(e).kind())
            .collect();

        // then (期待する結果):
        assert_eq!(
            kinds,
            vec![
                ErrorKind::Authorization,
                ErrorKind::NotFound,
                ErrorKind::Transient
            ]
        );
    }

    #[test]
    fn test_membership_error_kinds() {
        // テスト項目: 非メンバーは権限エラー、プロバイダ障害は一時的エラーに分類される
        // given (前提条件):
        let not_member = ChannelError::from(MembershipError::NotMember {
            user: "carol".to_string(),
            project: "p1".to_string(),
        });
        let provider = SendMessageError::from(MembershipError::from(ProviderError::Unavailable(
            "down".to_string(),
        )));

        // when (操作) / then (期待する結果):
        assert_eq!(not_member.kind(), ErrorKind::Authorization);
        assert_eq!(provider.kind(), ErrorKind::Transient);
        assert_eq!(ChannelError::ForeignPersonalChannel.kind(), ErrorKind::Authorization);
    }
}
