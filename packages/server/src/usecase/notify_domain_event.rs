//! UseCase: ドメインイベントによる通知
//!
//! メッセージ送信・タスク割り当て・プロジェクト参加・プロジェクト完了の各イベントから
//! 通知対象と文面を決め、Notification Fan-out Service に渡します。

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{
    DomainEvent, MembershipProvider, NotificationKind, NotificationTemplate, NotificationText,
    UserDirectory, UserId,
};

use super::{
    error::NotifyError,
    notification_fanout::{FanoutReport, NotificationFanoutService},
};

/// 開始したファンアウト
pub struct FanoutDispatch {
    /// アクターを除いた通知対象の人数
    pub recipients: usize,
    pub handle: JoinHandle<FanoutReport>,
}

pub struct NotifyDomainEventUseCase {
    membership: Arc<dyn MembershipProvider>,
    directory: Arc<dyn UserDirectory>,
    fanout: Arc<NotificationFanoutService>,
}

impl NotifyDomainEventUseCase {
    pub fn new(
        membership: Arc<dyn MembershipProvider>,
        directory: Arc<dyn UserDirectory>,
        fanout: Arc<NotificationFanoutService>,
    ) -> Self {
        Self {
            membership,
            directory,
            fanout,
        }
    }

    /// イベントの通知を開始する（配信の完了は待たない）
    pub async fn execute(&self, event: DomainEvent) -> Result<FanoutDispatch, NotifyError> {
        let project_id = event.project_id();
        let snapshot = self
            .membership
            .membership(project_id)
            .await?
            .ok_or_else(|| NotifyError::UnknownProject(project_id.to_string()))?;
        let project = snapshot.display_name();
        let actor = event.actor_id();

        let (recipients, kind, text) = match &event {
            DomainEvent::MessageSent { sender_id, .. } => (
                snapshot.recipients_excluding(sender_id),
                NotificationKind::Info,
                format!(
                    "{} sent a message in \"{}\"",
                    self.display_name(sender_id).await,
                    project
                ),
            ),
            DomainEvent::TaskAssigned {
                assignee_id,
                task_title,
                ..
            } => (
                vec![assignee_id.clone()],
                NotificationKind::Info,
                format!("You were assigned a new task: \"{}\"", task_title),
            ),
            DomainEvent::ProjectJoined { joiner_id, .. } => (
                vec![snapshot.owner_id.clone()],
                NotificationKind::Info,
                format!(
                    "{} joined \"{}\"",
                    self.display_name(joiner_id).await,
                    project
                ),
            ),
            DomainEvent::ProjectCompleted { actor_id, .. } => (
                snapshot.recipients_excluding(actor_id),
                NotificationKind::Success,
                format!("\"{}\" was completed", project),
            ),
        };

        let template = NotificationTemplate {
            message: NotificationText::new(text)?,
            kind,
            link: Some(format!("/projects/{}", project_id)),
        };
        let recipients = NotificationFanoutService::recipients_without_actor(actor, recipients);
        let count = recipients.len();
        tracing::debug!(
            "Dispatching {:?} notification for '{}' to {} recipient(s)",
            kind,
            project_id,
            count
        );

        Ok(FanoutDispatch {
            recipients: count,
            handle: self.fanout.dispatch(actor, recipients, template),
        })
    }

    async fn display_name(&self, user_id: &UserId) -> String {
        match self.directory.profile(user_id).await {
            Ok(Some(profile)) => profile.display_name().to_string(),
            Ok(None) => user_id.to_string(),
            Err(e) => {
                tracing::warn!("Failed to resolve profile of '{}': {}", user_id, e);
                user_id.to_string()
            }
        }
    }
}
