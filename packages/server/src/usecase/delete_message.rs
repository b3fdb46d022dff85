//! UseCase: メッセージ削除処理
//!
//! 送信者本人だけがメッセージを完全に削除できます（ソフトデリートはしない）。
//! 削除を確定してから、保存されていたプロジェクトのチャンネルに tombstone を配信します。

use std::sync::Arc;

use crate::domain::{
    ChannelId, Message, MessageId, MessagePusher, MessageRepository, RoomEvent, UserId,
};

use super::error::DeleteMessageError;

/// メッセージ削除のユースケース
pub struct DeleteMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DeleteMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// メッセージ削除を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 削除したメッセージ
    /// * `Err(DeleteMessageError)` - 存在しない、または送信者以外（ストアは変更されない）
    pub async fn execute(
        &self,
        message_id: &MessageId,
        requester_id: &UserId,
    ) -> Result<Message, DeleteMessageError> {
        // 1. 送信者確認と削除（ストア内で原子的に行う）
        let deleted = self
            .repository
            .delete_by_sender(message_id, requester_id)
            .await?;
        tracing::info!(
            "Message '{}' deleted from project '{}' by its sender",
            deleted.id,
            deleted.project_id
        );

        // 2. tombstone の配信
        let channel = ChannelId::project(deleted.project_id.clone());
        let tombstone = RoomEvent::MessageDeleted {
            message_id: deleted.id,
        };
        if let Err(e) = self.message_pusher.publish(&channel, &tombstone, None).await {
            tracing::warn!("Failed to broadcast deletion of '{}': {}", deleted.id, e);
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, MessageContent, ProjectId, SessionRegistry, Timestamp},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryMessageRepository,
            session::InMemorySessionRegistry,
        },
    };
    use tokio::sync::mpsc;

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    struct Fixture {
        repository: Arc<InMemoryMessageRepository>,
        usecase: DeleteMessageUseCase,
        rx: mpsc::Receiver<String>,
        message_id: MessageId,
    }

    /// alice のメッセージが 1 件あり、bob の接続が project:p1 に参加している状態
    async fn fixture() -> Fixture {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
        let repository = Arc::new(InMemoryMessageRepository::new());
        let usecase = DeleteMessageUseCase::new(repository.clone(), pusher.clone());

        let message_id = repository
            .append(
                ProjectId::try_from("p1").unwrap(),
                user("alice"),
                MessageContent::from_parts(Some("oops".to_string()), None, None).unwrap(),
            )
            .await
            .unwrap()
            .id;

        let connection_id = ConnectionId::generate();
        let (tx, rx) = mpsc::channel(8);
        registry.open(connection_id, user("bob"), Timestamp::new(0));
        pusher.register_connection(connection_id, tx).await;
        registry
            .join(
                &connection_id,
                ChannelId::project(ProjectId::try_from("p1").unwrap()),
            )
            .unwrap();

        Fixture {
            repository,
            usecase,
            rx,
            message_id,
        }
    }

    #[tokio::test]
    async fn test_sender_deletes_and_tombstone_is_broadcast() {
        // テスト項目: 送信者の削除でメッセージが消え、tombstone が配信される
        // given (前提条件):
        let mut f = fixture().await;

        // when (操作):
        let deleted = f.usecase.execute(&f.message_id, &user("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(deleted.id, f.message_id);
        assert!(f.repository.find(&f.message_id).await.unwrap().is_none());
        let frame = f.rx.recv().await.unwrap();
        assert_eq!(
            frame,
            format!(r#"{{"event":"message_deleted","data":"{}"}}"#, f.message_id)
        );
    }

    #[tokio::test]
    async fn test_other_user_cannot_delete() {
        // テスト項目: 送信者以外の削除は拒否され、ストアも変更されず配信もされない
        // given (前提条件):
        let mut f = fixture().await;

        // when (操作):
        let result = f.usecase.execute(&f.message_id, &user("bob")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(DeleteMessageError::NotSender(_))));
        assert!(f.repository.find(&f.message_id).await.unwrap().is_some());
        assert!(f.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_message() {
        // テスト項目: 存在しないメッセージの削除は NotFound
        // given (前提条件):
        let f = fixture().await;

        // when (操作):
        let result = f
            .usecase
            .execute(&MessageId::generate(), &user("alice"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(DeleteMessageError::NotFound(_))));
    }
}
