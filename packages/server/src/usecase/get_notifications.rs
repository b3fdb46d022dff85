//! UseCase: 通知一覧取得

use std::sync::Arc;

use crate::domain::{Notification, NotificationRepository, UserId};

use super::error::NotificationError;

/// 受信者の通知を新しい順に最大 `page_size` 件返す
pub struct GetNotificationsUseCase {
    repository: Arc<dyn NotificationRepository>,
    page_size: usize,
}

impl GetNotificationsUseCase {
    pub fn new(repository: Arc<dyn NotificationRepository>, page_size: usize) -> Self {
        Self {
            repository,
            page_size,
        }
    }

    pub async fn execute(&self, recipient_id: &UserId) -> Result<Vec<Notification>, NotificationError> {
        Ok(self
            .repository
            .list_recent(recipient_id, self.page_size)
            .await?)
    }
}
