//! InMemory Message Repository 実装
//!
//! プロジェクトごとにメッセージログを持ち、ログ単位の `Mutex` で書き込みを直列化します。
//! ストア全体を覆うロックはありません。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use teamroom_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    Message, MessageContent, MessageId, MessageRepository, ProjectId, ReadReceiptUpdate,
    RepositoryError, Timestamp, UserId,
};

/// 1 プロジェクト分のメッセージログ
#[derive(Debug, Default)]
struct ProjectLog {
    /// `created_at` の昇順
    messages: Vec<Message>,
    /// これまでに払い出した最大の `created_at`（削除しても戻らない）
    last_created_at: Option<Timestamp>,
}

impl ProjectLog {
    fn next_timestamp(&mut self, now: i64) -> Timestamp {
        let next = match self.last_created_at {
            Some(last) if now <= last.value() => last.value() + 1,
            _ => now,
        };
        let timestamp = Timestamp::new(next);
        self.last_created_at = Some(timestamp);
        timestamp
    }

    fn position(&self, message_id: &MessageId) -> Option<usize> {
        self.messages.iter().position(|m| &m.id == message_id)
    }
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    /// プロジェクト ID → メッセージログ
    logs: DashMap<ProjectId, Arc<Mutex<ProjectLog>>>,
    /// メッセージ ID → プロジェクト ID
    index: DashMap<MessageId, ProjectId>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageRepository {
    /// システム時計を使う InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 時計を指定して作成
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            logs: DashMap::new(),
            index: DashMap::new(),
            clock,
        }
    }

    fn log_for(&self, project_id: &ProjectId) -> Arc<Mutex<ProjectLog>> {
        self.logs.entry(project_id.clone()).or_default().clone()
    }

    fn existing_log(&self, project_id: &ProjectId) -> Option<Arc<Mutex<ProjectLog>>> {
        self.logs.get(project_id).map(|log| log.clone())
    }

    fn log_of_message(&self, message_id: &MessageId) -> Option<Arc<Mutex<ProjectLog>>> {
        let project_id = self.index.get(message_id).map(|p| p.clone())?;
        self.existing_log(&project_id)
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn append(
        &self,
        project_id: ProjectId,
        sender_id: UserId,
        content: MessageContent,
    ) -> Result<Message, RepositoryError> {
        let log = self.log_for(&project_id);
        let mut log = log.lock().await;

        let created_at = log.next_timestamp(self.clock.now_millis());
        let message = Message::new(
            MessageId::generate(),
            project_id.clone(),
            sender_id,
            content,
            created_at,
        );
        log.messages.push(message.clone());
        self.index.insert(message.id, project_id);

        Ok(message)
    }

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        let Some(log) = self.existing_log(project_id) else {
            return Ok(Vec::new());
        };
        let log = log.lock().await;
        let start = log.messages.len().saturating_sub(limit);
        Ok(log.messages[start..].to_vec())
    }

    async fn find(&self, message_id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let Some(log) = self.log_of_message(message_id) else {
            return Ok(None);
        };
        let log = log.lock().await;
        Ok(log.messages.iter().find(|m| &m.id == message_id).cloned())
    }

    async fn delete_by_sender(
        &self,
        message_id: &MessageId,
        requester_id: &UserId,
    ) -> Result<Message, RepositoryError> {
        let not_found = || RepositoryError::MessageNotFound(message_id.to_string());
        let log = self.log_of_message(message_id).ok_or_else(not_found)?;
        let mut log = log.lock().await;

        let position = log.position(message_id).ok_or_else(not_found)?;
        if &log.messages[position].sender_id != requester_id {
            return Err(RepositoryError::NotOwner {
                requester: requester_id.to_string(),
                resource: format!("message '{}'", message_id),
            });
        }

        let removed = log.messages.remove(position);
        self.index.remove(message_id);
        Ok(removed)
    }

    async fn add_reader_if_absent(
        &self,
        message_id: &MessageId,
        reader_id: &UserId,
    ) -> Result<ReadReceiptUpdate, RepositoryError> {
        let not_found = || RepositoryError::MessageNotFound(message_id.to_string());
        let log = self.log_of_message(message_id).ok_or_else(not_found)?;
        let mut log = log.lock().await;

        let position = log.position(message_id).ok_or_else(not_found)?;
        let message = &mut log.messages[position];
        let added = message.add_reader(reader_id);

        Ok(ReadReceiptUpdate {
            message_id: *message_id,
            project_id: message.project_id.clone(),
            added,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamroom_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - メッセージ追加時の read_by 初期値と created_at の単調増加
    // - プロジェクト単位の一覧（昇順・件数上限・削除済みを含まない）
    // - 送信者のみが削除できること
    // - add-if-absent の冪等性と並行実行時に更新が失われないこと
    // ========================================

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    fn project(id: &str) -> ProjectId {
        ProjectId::try_from(id).unwrap()
    }

    fn text(value: &str) -> MessageContent {
        MessageContent::from_parts(Some(value.to_string()), None, None).unwrap()
    }

    fn create_test_repository() -> InMemoryMessageRepository {
        InMemoryMessageRepository::with_clock(Arc::new(FixedClock::new(1_700_000_000_000)))
    }

    #[tokio::test]
    async fn test_append_sets_sender_as_reader() {
        // テスト項目: 追加したメッセージの read_by は送信者のみ
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let message = repo
            .append(project("p1"), user("alice"), text("hi"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.read_by(), &[user("alice")]);
        assert_eq!(message.created_at.value(), 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_append_timestamps_strictly_increase_with_frozen_clock() {
        // テスト項目: 時計が進まなくても同一プロジェクト内の created_at は厳密に増加する
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let first = repo.append(project("p1"), user("a"), text("1")).await.unwrap();
        let second = repo.append(project("p1"), user("a"), text("2")).await.unwrap();
        let other = repo.append(project("p2"), user("a"), text("x")).await.unwrap();

        // then (期待する結果):
        assert!(second.created_at > first.created_at);
        // 別プロジェクトのログは独立
        assert_eq!(other.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_list_by_project_ascending_with_limit() {
        // テスト項目: 一覧は昇順で、上限を超える場合は直近の件数だけ返す
        // given (前提条件):
        let repo = create_test_repository();
        for i in 0..5 {
            repo.append(project("p1"), user("a"), text(&format!("m{}", i)))
                .await
                .unwrap();
        }

        // when (操作):
        let messages = repo.list_by_project(&project("p1"), 3).await.unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = messages.iter().filter_map(|m| m.content.text()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
        assert!(messages.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test]
    async fn test_list_unknown_project_is_empty() {
        // テスト項目: メッセージの無いプロジェクトは空の一覧
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let messages = repo.list_by_project(&project("nothing"), 10).await.unwrap();

        // then (期待する結果):
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_sender_removes_permanently() {
        // テスト項目: 送信者による削除でメッセージが一覧・検索から消える
        // given (前提条件):
        let repo = create_test_repository();
        let message = repo.append(project("p1"), user("alice"), text("hi")).await.unwrap();

        // when (操作):
        let removed = repo.delete_by_sender(&message.id, &user("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(removed.id, message.id);
        assert!(repo.find(&message.id).await.unwrap().is_none());
        assert!(repo.list_by_project(&project("p1"), 10).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete_by_sender(&message.id, &user("alice")).await,
            Err(RepositoryError::MessageNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_other_user_leaves_store_unchanged() {
        // テスト項目: 送信者以外の削除は NotOwner となりストアは変わらない
        // given (前提条件):
        let repo = create_test_repository();
        let message = repo.append(project("p1"), user("alice"), text("hi")).await.unwrap();

        // when (操作):
        let result = repo.delete_by_sender(&message.id, &user("bob")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::NotOwner { .. })));
        assert_eq!(repo.find(&message.id).await.unwrap(), Some(message));
    }

    #[tokio::test]
    async fn test_add_reader_if_absent_is_idempotent() {
        // テスト項目: 同じ既読追加を 2 回行っても結果は 1 回と同じ
        // given (前提条件):
        let repo = create_test_repository();
        let message = repo.append(project("p1"), user("alice"), text("hi")).await.unwrap();

        // when (操作):
        let first = repo.add_reader_if_absent(&message.id, &user("bob")).await.unwrap();
        let second = repo.add_reader_if_absent(&message.id, &user("bob")).await.unwrap();

        // then (期待する結果):
        assert!(first.added);
        assert!(!second.added);
        assert_eq!(first.project_id, project("p1"));
        let stored = repo.find(&message.id).await.unwrap().unwrap();
        assert_eq!(stored.read_by(), &[user("alice"), user("bob")]);
    }

    #[tokio::test]
    async fn test_add_reader_unknown_message() {
        // テスト項目: 存在しないメッセージへの既読追加は MessageNotFound
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let result = repo
            .add_reader_if_absent(&MessageId::generate(), &user("bob"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::MessageNotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_readers_do_not_lose_updates() {
        // テスト項目: 複数の読者が同時に既読を付けても更新が失われない
        // given (前提条件):
        let repo = Arc::new(create_test_repository());
        let message = repo.append(project("p1"), user("alice"), text("hi")).await.unwrap();

        // when (操作):
        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            let message_id = message.id;
            handles.push(tokio::spawn(async move {
                let reader = user(&format!("reader-{}", i % 16));
                repo.add_reader_if_absent(&message_id, &reader).await.unwrap()
            }));
        }
        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap().added {
                added += 1;
            }
        }

        // then (期待する結果): 16 人分がちょうど 1 回ずつ追加される
        assert_eq!(added, 16);
        let stored = repo.find(&message.id).await.unwrap().unwrap();
        assert_eq!(stored.read_by().len(), 17);
    }
}
