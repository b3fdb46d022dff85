//! UseCase: 既読処理
//!
//! ## 処理の流れ
//!
//! 1. 対象メッセージを取得し、保存されているプロジェクトごとにまとめる
//! 2. 各プロジェクトのメンバーシップを確認（変更前に全て確認する）
//! 3. Read-Receipt Tracker で既読を追加
//! 4. プロジェクトごとに `messages_read` を配信（既読にした接続自身は除く）

use std::sync::Arc;

use crate::domain::{
    ChannelId, ConnectionId, MessageId, MessagePusher, MessageRepository, ProjectId,
    ReadReceiptUpdate, RoomEvent, UserId,
};

use super::{error::MessageQueryError, membership::MembershipGuard, read_receipt::ReadReceiptTracker};

pub struct MarkMessagesReadUseCase {
    repository: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    guard: Arc<MembershipGuard>,
    tracker: Arc<ReadReceiptTracker>,
}

impl MarkMessagesReadUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        guard: Arc<MembershipGuard>,
        tracker: Arc<ReadReceiptTracker>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            guard,
            tracker,
        }
    }

    /// 既読処理を実行
    ///
    /// # Arguments
    ///
    /// * `reader_id` - 認証済みの既読ユーザー
    /// * `message_ids` - 既読にするメッセージ（存在しないものは読み飛ばす）
    /// * `origin` - 要求元の接続（`messages_read` の配信から除く）
    pub async fn execute(
        &self,
        reader_id: &UserId,
        message_ids: &[MessageId],
        origin: Option<&ConnectionId>,
    ) -> Result<Vec<ReadReceiptUpdate>, MessageQueryError> {
        // 1. プロジェクトごとにまとめる（クライアント指定のプロジェクトは使わない）
        let mut projects: Vec<ProjectId> = Vec::new();
        for message_id in message_ids {
            if let Some(message) = self.repository.find(message_id).await?
                && !projects.contains(&message.project_id)
            {
                projects.push(message.project_id);
            }
        }

        // 2. メンバーシップ確認
        for project_id in &projects {
            self.guard.check(project_id, reader_id, "mark_read").await?;
        }

        // 3. 既読を追加
        let updates = self.tracker.mark_read(message_ids, reader_id).await?;

        // 4. プロジェクトごとに配信
        for project_id in &projects {
            let ids: Vec<MessageId> = updates
                .iter()
                .filter(|u| &u.project_id == project_id)
                .map(|u| u.message_id)
                .collect();
            if ids.is_empty() {
                continue;
            }
            let channel = ChannelId::project(project_id.clone());
            let event = RoomEvent::MessagesRead {
                reader_id: reader_id.clone(),
                message_ids: ids,
            };
            if let Err(e) = self.message_pusher.publish(&channel, &event, origin).await {
                tracing::warn!("Failed to broadcast read receipts on '{}': {}", channel, e);
            }
        }

        tracing::debug!(
            "'{}' marked {} message(s) read ({} newly)",
            reader_id,
            updates.len(),
            updates.iter().filter(|u| u.added).count()
        );
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MembershipSnapshot, MessageContent, SessionRegistry, Timestamp},
        infrastructure::{
            directory::InMemoryDirectory, message_pusher::WebSocketMessagePusher,
            repository::InMemoryMessageRepository, session::InMemorySessionRegistry,
        },
        usecase::error::MembershipError,
    };
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 既読が永続化され、`messages_read` が要求元以外に配信されること
    // - 同じ要求を繰り返しても既読状態が変わらないこと（冪等）
    // - enforce 有効時、非メンバーの既読は何も変更しないこと
    // ========================================

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    fn project(id: &str) -> ProjectId {
        ProjectId::try_from(id).unwrap()
    }

    struct Fixture {
        registry: Arc<InMemorySessionRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        repository: Arc<InMemoryMessageRepository>,
        usecase: MarkMessagesReadUseCase,
    }

    impl Fixture {
        /// p1: owner=alice（コラボレーターなし）
        fn new(enforce: bool) -> Self {
            let directory = Arc::new(InMemoryDirectory::new());
            directory.upsert_project(MembershipSnapshot {
                project_id: project("p1"),
                name: None,
                owner_id: user("alice"),
                collaborators: Vec::new(),
            });
            let registry = Arc::new(InMemorySessionRegistry::new());
            let pusher = Arc::new(WebSocketMessagePusher::new(registry.clone()));
            let repository = Arc::new(InMemoryMessageRepository::new());
            let usecase = MarkMessagesReadUseCase::new(
                repository.clone(),
                pusher.clone(),
                Arc::new(MembershipGuard::new(directory, enforce)),
                Arc::new(ReadReceiptTracker::new(repository.clone())),
            );
            Self {
                registry,
                pusher,
                repository,
                usecase,
            }
        }

        async fn seed(&self, sender: &str) -> MessageId {
            self.repository
                .append(
                    project("p1"),
                    user(sender),
                    MessageContent::from_parts(Some("hi".to_string()), None, None).unwrap(),
                )
                .await
                .unwrap()
                .id
        }

        async fn connect_to_p1(&self, who: &str) -> (ConnectionId, mpsc::Receiver<String>) {
            let connection_id = ConnectionId::generate();
            let (tx, rx) = mpsc::channel(8);
            self.registry.open(connection_id, user(who), Timestamp::new(0));
            self.pusher.register_connection(connection_id, tx).await;
            self.registry
                .join(&connection_id, ChannelId::project(project("p1")))
                .unwrap();
            (connection_id, rx)
        }
    }

    #[tokio::test]
    async fn test_mark_read_broadcasts_to_others_only() {
        // テスト項目: 既読が永続化され、要求元以外の接続に messages_read が届く
        // given (前提条件):
        let f = Fixture::new(false);
        let m1 = f.seed("alice").await;
        let (_alice_conn, mut alice_rx) = f.connect_to_p1("alice").await;
        let (bob_conn, mut bob_rx) = f.connect_to_p1("bob").await;

        // when (操作):
        let updates = f
            .usecase
            .execute(&user("bob"), &[m1], Some(&bob_conn))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(updates[0].added);
        let stored = f.repository.find(&m1).await.unwrap().unwrap();
        assert_eq!(stored.read_by(), &[user("alice"), user("bob")]);

        let frame: serde_json::Value =
            serde_json::from_str(&alice_rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["event"], "messages_read");
        assert_eq!(frame["data"]["userId"], "bob");
        assert_eq!(frame["data"]["messageIds"][0], m1.to_string());
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        // テスト項目: 同じ既読要求を 2 回行っても既読状態は 1 回目と同じ
        // given (前提条件):
        let f = Fixture::new(false);
        let m1 = f.seed("alice").await;
        let m2 = f.seed("alice").await;
        f.usecase.execute(&user("bob"), &[m1, m2], None).await.unwrap();
        let after_first = f.repository.list_by_project(&project("p1"), 200).await.unwrap();

        // when (操作):
        let updates = f.usecase.execute(&user("bob"), &[m1, m2], None).await.unwrap();

        // then (期待する結果):
        assert!(updates.iter().all(|u| !u.added));
        let after_second = f.repository.list_by_project(&project("p1"), 200).await.unwrap();
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_skipped() {
        // テスト項目: 存在しない ID は無視され、存在する ID だけ既読になる
        // given (前提条件):
        let f = Fixture::new(false);
        let m1 = f.seed("alice").await;

        // when (操作):
        let updates = f
            .usecase
            .execute(&user("bob"), &[MessageId::generate(), m1], None)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].message_id, m1);
    }

    #[tokio::test]
    async fn test_non_member_read_rejected_when_enforced() {
        // テスト項目: enforce 有効時、非メンバーの既読は拒否され何も変更されない
        // given (前提条件):
        let f = Fixture::new(true);
        let m1 = f.seed("alice").await;

        // when (操作):
        let result = f.usecase.execute(&user("carol"), &[m1], None).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(MessageQueryError::Membership(MembershipError::NotMember { .. }))
        ));
        let stored = f.repository.find(&m1).await.unwrap().unwrap();
        assert_eq!(stored.read_by(), &[user("alice")]);
    }
}
