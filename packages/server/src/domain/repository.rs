//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    Message, MessageContent, MessageId, NewNotification, Notification, NotificationId, ProjectId,
    RepositoryError, UserId,
};

/// 既読追加（add-if-absent）の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceiptUpdate {
    pub message_id: MessageId,
    /// メッセージが属するプロジェクト（配信先の決定に使う）
    pub project_id: ProjectId,
    /// 今回の呼び出しで追加された場合 `true`
    pub added: bool,
}

/// Message Store
///
/// プロジェクトごとの順序付きメッセージログ。
/// 同一プロジェクト内の `created_at` は厳密に増加する。
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを追加する（`read_by` は送信者のみ）
    async fn append(
        &self,
        project_id: ProjectId,
        sender_id: UserId,
        content: MessageContent,
    ) -> Result<Message, RepositoryError>;

    /// プロジェクトの直近 `limit` 件を `created_at` の昇順で取得
    async fn list_by_project(
        &self,
        project_id: &ProjectId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// ID でメッセージを取得
    async fn find(&self, message_id: &MessageId) -> Result<Option<Message>, RepositoryError>;

    /// 送信者本人の要求に限りメッセージを完全に削除する
    ///
    /// 削除したメッセージを返す。存在しなければ `MessageNotFound`、
    /// 送信者以外なら `NotOwner`（ストアは変更しない）。
    async fn delete_by_sender(
        &self,
        message_id: &MessageId,
        requester_id: &UserId,
    ) -> Result<Message, RepositoryError>;

    /// `read_by` に `reader_id` が無ければ追加する（単一の原子的操作）
    async fn add_reader_if_absent(
        &self,
        message_id: &MessageId,
        reader_id: &UserId,
    ) -> Result<ReadReceiptUpdate, RepositoryError>;
}

/// Notification Store
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// 通知を作成（未読）
    async fn create(&self, notification: NewNotification) -> Result<Notification, RepositoryError>;

    /// 受信者の通知を新しい順に最大 `limit` 件取得
    async fn list_recent(
        &self,
        recipient_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// 受信者本人の通知を既読にする
    async fn mark_read(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> Result<Notification, RepositoryError>;

    /// 受信者の未読通知を全て既読にし、更新件数を返す
    async fn mark_all_read(&self, recipient_id: &UserId) -> Result<usize, RepositoryError>;

    /// 受信者本人の通知を削除する
    async fn delete(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> Result<(), RepositoryError>;
}
