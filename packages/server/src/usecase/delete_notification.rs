//! UseCase: 通知の削除

use std::sync::Arc;

use crate::domain::{NotificationId, NotificationRepository, UserId};

use super::error::NotificationError;

pub struct DeleteNotificationUseCase {
    repository: Arc<dyn NotificationRepository>,
}

impl DeleteNotificationUseCase {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    /// 受信者本人の通知を削除する
    pub async fn execute(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> Result<(), NotificationError> {
        self.repository.delete(notification_id, recipient_id).await?;
        tracing::debug!(
            "Notification '{}' deleted by '{}'",
            notification_id,
            recipient_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{NewNotification, NotificationKind, NotificationText},
        infrastructure::repository::InMemoryNotificationRepository,
        usecase::error::{ErrorKind, UseCaseError},
    };

    #[tokio::test]
    async fn test_delete_own_notification_then_missing() {
        // テスト項目: 自分の通知は削除でき、2 回目は NotFound になる
        // given (前提条件):
        let repository = Arc::new(InMemoryNotificationRepository::new());
        let bob = UserId::try_from("bob").unwrap();
        let id = repository
            .create(NewNotification {
                recipient_id: bob.clone(),
                message: NotificationText::new("ping".to_string()).unwrap(),
                kind: NotificationKind::Warning,
                link: None,
            })
            .await
            .unwrap()
            .id;
        let usecase = DeleteNotificationUseCase::new(repository.clone());

        // when (操作):
        let first = usecase.execute(&id, &bob).await;
        let second = usecase.execute(&id, &bob).await;

        // then (期待する結果):
        assert!(first.is_ok());
        assert_eq!(second.unwrap_err().kind(), ErrorKind::NotFound);
        assert!(repository.list_recent(&bob, 20).await.unwrap().is_empty());
    }
}
