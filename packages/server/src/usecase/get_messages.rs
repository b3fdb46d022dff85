//! UseCase: プロジェクトのメッセージ一覧取得

use std::sync::Arc;

use crate::domain::{MessageRepository, MessageView, ProjectId, UserId};

use super::{error::MessageQueryError, membership::MembershipGuard, message_view::MessageViewResolver};

/// メッセージ一覧取得のユースケース
///
/// 直近 `page_size` 件を `created_at` の昇順で返す。
pub struct GetMessagesUseCase {
    repository: Arc<dyn MessageRepository>,
    guard: Arc<MembershipGuard>,
    resolver: Arc<MessageViewResolver>,
    page_size: usize,
}

impl GetMessagesUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        guard: Arc<MembershipGuard>,
        resolver: Arc<MessageViewResolver>,
        page_size: usize,
    ) -> Self {
        Self {
            repository,
            guard,
            resolver,
            page_size,
        }
    }

    pub async fn execute(
        &self,
        requester_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<Vec<MessageView>, MessageQueryError> {
        self.guard
            .check(project_id, requester_id, "list_messages")
            .await?;
        let messages = self
            .repository
            .list_by_project(project_id, self.page_size)
            .await?;
        Ok(self.resolver.resolve_all(messages).await)
    }
}
