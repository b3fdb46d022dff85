//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → `receive_message` のブロードキャスト → 通知ファンアウトの順序
//!
//! ### なぜこのテストが必要か
//! - 永続化前にブロードキャストしないこと（受信したメッセージは必ず一覧に含まれる）
//! - プロジェクトチャンネルに参加していない接続にはメッセージが届かないこと
//! - 通知の失敗が送信を失敗させないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者へのブロードキャストと送信者以外への通知
//! - 異常系：enforce 有効時の非メンバーの送信（何も永続化されない）
//! - エッジケース：メンバーシップ不明のプロジェクト（送信は成功、通知なし）

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{
    ChannelId, DomainEvent, MessageContent, MessagePusher, MessageRepository, MessageView,
    ProjectId, RoomEvent, UserId,
};

use super::{
    error::SendMessageError, membership::MembershipGuard, message_view::MessageViewResolver,
    notification_fanout::FanoutReport, notify_domain_event::NotifyDomainEventUseCase,
};

/// 送信結果
pub struct SentMessage {
    /// 永続化され、ブロードキャストされたメッセージ
    pub view: MessageView,
    /// 通知ファンアウトの完了（通知対象が決まらなかった場合は `None`）
    pub fanout: JoinHandle<Option<FanoutReport>>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    guard: Arc<MembershipGuard>,
    resolver: Arc<MessageViewResolver>,
    notifier: Arc<NotifyDomainEventUseCase>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        guard: Arc<MembershipGuard>,
        resolver: Arc<MessageViewResolver>,
        notifier: Arc<NotifyDomainEventUseCase>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            guard,
            resolver,
            notifier,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender_id` - 認証済みの送信者
    /// * `project_id` - 送信先プロジェクト
    /// * `content` - 検証済みのメッセージ内容
    ///
    /// # Returns
    ///
    /// * `Ok(SentMessage)` - 永続化とブロードキャストが完了（通知は非同期に継続）
    /// * `Err(SendMessageError)` - 送信失敗（何も永続化されていない）
    pub async fn execute(
        &self,
        sender_id: UserId,
        project_id: ProjectId,
        content: MessageContent,
    ) -> Result<SentMessage, SendMessageError> {
        // 1. メンバーシップ確認
        self.guard
            .check(&project_id, &sender_id, "send_message")
            .await?;

        // 2. 永続化（ブロードキャストより先）
        let message = self
            .repository
            .append(project_id.clone(), sender_id.clone(), content)
            .await?;
        tracing::debug!(
            "Message '{}' stored in project '{}'",
            message.id,
            project_id
        );

        // 3. プロジェクトチャンネルへブロードキャスト
        let view = self.resolver.resolve(message).await;
        let channel = ChannelId::project(project_id.clone());
        if let Err(e) = self
            .message_pusher
            .publish(&channel, &RoomEvent::MessageReceived(view.clone()), None)
            .await
        {
            tracing::warn!("Failed to broadcast message '{}': {}", view.message.id, e);
        }

        // 4. 通知ファンアウト（送信の結果には影響しない）
        let notifier = self.notifier.clone();
        let event = DomainEvent::MessageSent {
            project_id,
            sender_id,
        };
        let fanout = tokio::spawn(async move {
            match notifier.execute(event).await {
                Ok(dispatch) => match dispatch.handle.await {
                    Ok(report) => Some(report),
                    Err(e) => {
                        tracing::error!("Fan-out supervisor failed: {}", e);
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!("Skipped message notifications: {}", e);
                    None
                }
            }
        });

        Ok(SentMessage { view, fanout })
    }
}
