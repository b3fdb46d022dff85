//! Notification Fan-out Service
//!
//! ## 処理の流れ
//!
//! 1. 通知対象からアクター本人と重複を除く
//! 2. supervisor タスクを起動し、即座に `JoinHandle` を返す（呼び出し元は待たない）
//! 3. 受信者ごとのタスクを `JoinSet` で実行（`Semaphore` で同時実行数を制限）
//! 4. 各タスクは通知を永続化してから `user:{id}` チャンネルへ配信する
//!
//! 配信は `push_timeout` で打ち切り、再試行しません。
//! 受信者ごとの失敗は他の受信者や呼び出し元に影響しません。

use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::{
    sync::Semaphore,
    task::{JoinHandle, JoinSet},
};

use crate::domain::{
    ChannelId, MessagePusher, NotificationRepository, NotificationTemplate, RoomEvent, UserId,
};

/// 1 回のファンアウトの結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// 通知対象の人数
    pub recipients: usize,
    /// 永続化できた通知の数
    pub persisted: usize,
    /// 受信者の接続へ届けられた通知の数
    pub pushed: usize,
    /// 永続化に失敗した数（パニック・中断した受信者タスクも含む）
    pub failed: usize,
}

/// 受信者 1 人分の結果
enum RecipientOutcome {
    Pushed,
    PersistedOnly,
    Failed,
}

pub struct NotificationFanoutService {
    repository: Arc<dyn NotificationRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    concurrency: usize,
    push_timeout: Duration,
}

impl NotificationFanoutService {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        concurrency: usize,
        push_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            concurrency: concurrency.max(1),
            push_timeout,
        }
    }

    /// 通知対象（アクターと重複を除いたもの）
    pub fn recipients_without_actor(actor: &UserId, recipients: Vec<UserId>) -> Vec<UserId> {
        let mut seen = HashSet::new();
        recipients
            .into_iter()
            .filter(|id| id != actor)
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }

    /// ファンアウトを開始する
    ///
    /// # Returns
    ///
    /// * `JoinHandle<FanoutReport>` - 全受信者の処理が終わると結果を返す
    pub fn dispatch(
        &self,
        actor: &UserId,
        recipients: Vec<UserId>,
        template: NotificationTemplate,
    ) -> JoinHandle<FanoutReport> {
        let recipients = Self::recipients_without_actor(actor, recipients);
        let repository = self.repository.clone();
        let message_pusher = self.message_pusher.clone();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let push_timeout = self.push_timeout;
        let template = Arc::new(template);
        let actor = actor.clone();

        tokio::spawn(async move {
            let mut report = FanoutReport {
                recipients: recipients.len(),
                ..FanoutReport::default()
            };
            let mut tasks = JoinSet::new();

            for recipient in recipients {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let repository = repository.clone();
                let message_pusher = message_pusher.clone();
                let template = template.clone();
                tasks.spawn(async move {
                    let outcome = notify_recipient(
                        repository.as_ref(),
                        message_pusher.as_ref(),
                        &template,
                        recipient,
                        push_timeout,
                    )
                    .await;
                    drop(permit);
                    outcome
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(RecipientOutcome::Pushed) => {
                        report.persisted += 1;
                        report.pushed += 1;
                    }
                    Ok(RecipientOutcome::PersistedOnly) => report.persisted += 1,
                    Ok(RecipientOutcome::Failed) => report.failed += 1,
                    Err(e) => {
                        report.failed += 1;
                        tracing::error!("Notification task panicked: {}", e);
                    }
                }
            }

            tracing::info!(
                "Fan-out by '{}' finished: recipients={}, persisted={}, pushed={}, failed={}",
                actor,
                report.recipients,
                report.persisted,
                report.pushed,
                report.failed
            );
            report
        })
    }
}

async fn notify_recipient(
    repository: &dyn NotificationRepository,
    message_pusher: &dyn MessagePusher,
    template: &NotificationTemplate,
    recipient: UserId,
    push_timeout: Duration,
) -> RecipientOutcome {
    // 配信より先に永続化する
    let notification = match repository
        .create(template.for_recipient(recipient.clone()))
        .await
    {
        Ok(notification) => notification,
        Err(e) => {
            tracing::warn!("Failed to persist notification for '{}': {}", recipient, e);
            return RecipientOutcome::Failed;
        }
    };

    let channel = ChannelId::user(recipient);
    let event = RoomEvent::NotificationCreated(notification);
    match tokio::time::timeout(push_timeout, message_pusher.publish(&channel, &event, None)).await
    {
        Ok(Ok(report)) if report.delivered > 0 => RecipientOutcome::Pushed,
        Ok(Ok(_)) => {
            tracing::debug!("No live connection on '{}'; notification stored only", channel);
            RecipientOutcome::PersistedOnly
        }
        Ok(Err(e)) => {
            tracing::warn!("Failed to push notification on '{}': {}", channel, e);
            RecipientOutcome::PersistedOnly
        }
        Err(_) => {
            tracing::warn!(
                "Push of notification on '{}' timed out after {:?}",
                channel,
                push_timeout
            );
            RecipientOutcome::PersistedOnly
        }
    }
}
