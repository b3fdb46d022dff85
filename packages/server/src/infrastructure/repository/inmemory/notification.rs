//! InMemory Notification Repository 実装

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use teamroom_shared::time::{Clock, SystemClock};
use tokio::sync::Mutex;

use crate::domain::{
    NewNotification, Notification, NotificationId, NotificationRepository, RepositoryError,
    Timestamp, UserId,
};

#[derive(Debug, Default)]
struct NotificationTable {
    by_id: HashMap<NotificationId, Notification>,
    /// 受信者 → 通知 ID（作成順）
    inbox: HashMap<UserId, Vec<NotificationId>>,
}

impl NotificationTable {
    /// 受信者本人の通知を取得する（他人の通知なら NotOwner）
    fn owned_mut(
        &mut self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> Result<&mut Notification, RepositoryError> {
        let notification = self
            .by_id
            .get_mut(notification_id)
            .ok_or_else(|| RepositoryError::NotificationNotFound(notification_id.to_string()))?;
        if &notification.recipient_id != recipient_id {
            return Err(RepositoryError::NotOwner {
                requester: recipient_id.to_string(),
                resource: format!("notification '{}'", notification_id),
            });
        }
        Ok(notification)
    }
}

/// インメモリ Notification Repository 実装
pub struct InMemoryNotificationRepository {
    table: Mutex<NotificationTable>,
    clock: Arc<dyn Clock>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Mutex::new(NotificationTable::default()),
            clock,
        }
    }
}

impl Default for InMemoryNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        let created = Notification {
            id: NotificationId::generate(),
            recipient_id: notification.recipient_id,
            message: notification.message,
            kind: notification.kind,
            read: false,
            link: notification.link,
            created_at: Timestamp::new(self.clock.now_millis()),
        };

        let mut table = self.table.lock().await;
        table
            .inbox
            .entry(created.recipient_id.clone())
            .or_default()
            .push(created.id);
        table.by_id.insert(created.id, created.clone());

        Ok(created)
    }

    async fn list_recent(
        &self,
        recipient_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let table = self.table.lock().await;
        let Some(ids) = table.inbox.get(recipient_id) else {
            return Ok(Vec::new());
        };

        // 作成順に並んでいるので末尾から取れば新しい順になる
        Ok(ids
            .iter()
            .rev()
            .filter_map(|id| table.by_id.get(id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> Result<Notification, RepositoryError> {
        let mut table = self.table.lock().await;
        let notification = table.owned_mut(notification_id, recipient_id)?;
        notification.read = true;
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, recipient_id: &UserId) -> Result<usize, RepositoryError> {
        let mut table = self.table.lock().await;
        let NotificationTable { by_id, inbox } = &mut *table;
        let Some(ids) = inbox.get(recipient_id) else {
            return Ok(0);
        };

        let mut updated = 0;
        for id in ids {
            if let Some(notification) = by_id.get_mut(id)
                && !notification.read
            {
                notification.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete(
        &self,
        notification_id: &NotificationId,
        recipient_id: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        table.owned_mut(notification_id, recipient_id)?;

        table.by_id.remove(notification_id);
        if let Some(ids) = table.inbox.get_mut(recipient_id) {
            ids.retain(|id| id != notification_id);
        }
        Ok(())
    }
}
