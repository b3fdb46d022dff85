//! UseCase: 通知の既読化（1 件 / 全件）

use std::sync::Arc;

use crate::domain::{Notification, NotificationId, NotificationRepository, UserId};

use super::error::NotificationError;

pub struct UpdateNotificationUseCase {
    repository: Arc<dyn NotificationRepository>,
}

impl UpdateNotificationUseCase {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// 受信者本人の通知を 1 件既読にする
    pub async fn mark_read(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> Result<Notification, NotificationError> {
        let notification = self
            .repository
            .mark_read(notification_id, recipient_id)
            .await?;
        tracing::debug!("Notification '{}' marked read", notification_id);
        Ok(notification)
    }

    /// 受信者の未読通知を全て既読にする
    ///
    /// # Returns
    ///
    /// 既読にした件数
    pub async fn mark_all_read(&self, recipient_id: &UserId) -> Result<usize, NotificationError> {
        let updated = self.repository.mark_all_read(recipient_id).await?;
        tracing::debug!("'{}' marked {} notification(s) read", recipient_id, updated);
        Ok(updated)
    }
}
