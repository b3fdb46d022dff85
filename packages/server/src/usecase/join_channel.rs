//! UseCase: チャンネル参加・離脱
//!
//! - `join_user`: 個人チャンネル `user:{id}` へ参加（接続自身のユーザーのみ）
//! - `join_project`: プロジェクトチャンネル `project:{id}` へ参加（メンバーシップ確認あり）
//! - `leave_project`: プロジェクトチャンネルから離脱
//!
//! いずれも成功すると接続に `joined` / `left` の確認イベントを返します。

use std::sync::Arc;

use crate::domain::{
    ChannelId, ConnectionId, MessagePusher, ProjectId, RoomEvent, SessionError, SessionRegistry,
    UserId,
};

use super::{error::ChannelError, membership::MembershipGuard};

pub struct JoinChannelUseCase {
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    guard: Arc<MembershipGuard>,
}

impl JoinChannelUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        guard: Arc<MembershipGuard>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            guard,
        }
    }

    /// 個人チャンネルに参加する
    pub async fn join_user(
        &self,
        connection_id: &ConnectionId,
        requested: UserId,
    ) -> Result<ChannelId, ChannelError> {
        let owner = self.owner_of(connection_id)?;
        if owner != requested {
            tracing::warn!(
                "'{}' tried to join the personal channel of '{}'",
                owner,
                requested
            );
            return Err(ChannelError::ForeignPersonalChannel);
        }
        self.join(connection_id, ChannelId::user(requested)).await
    }

    /// プロジェクトチャンネルに参加する
    pub async fn join_project(
        &self,
        connection_id: &ConnectionId,
        project_id: ProjectId,
    ) -> Result<ChannelId, ChannelError> {
        let user_id = self.owner_of(connection_id)?;
        self.guard
            .check(&project_id, &user_id, "join_project")
            .await?;
        self.join(connection_id, ChannelId::project(project_id))
            .await
    }

    /// プロジェクトチャンネルから離脱する
    ///
    /// 参加していなかった場合も確認イベントを返す（離脱は冪等）。
    pub async fn leave_project(
        &self,
        connection_id: &ConnectionId,
        project_id: ProjectId,
    ) -> Result<bool, ChannelError> {
        self.owner_of(connection_id)?;
        let channel = ChannelId::project(project_id);
        let was_member = self.registry.leave(connection_id, &channel);
        tracing::debug!("Connection '{}' left '{}'", connection_id, channel);
        self.acknowledge(connection_id, RoomEvent::ChannelLeft(channel))
            .await;
        Ok(was_member)
    }

    fn owner_of(&self, connection_id: &ConnectionId) -> Result<UserId, ChannelError> {
        self.registry
            .user_of(connection_id)
            .ok_or_else(|| SessionError::UnknownConnection(connection_id.to_string()).into())
    }

    async fn join(
        &self,
        connection_id: &ConnectionId,
        channel: ChannelId,
    ) -> Result<ChannelId, ChannelError> {
        let newly_joined = self.registry.join(connection_id, channel.clone())?;
        tracing::debug!(
            "Connection '{}' joined '{}' (new: {})",
            connection_id,
            channel,
            newly_joined
        );
        self.acknowledge(connection_id, RoomEvent::ChannelJoined(channel.clone()))
            .await;
        Ok(channel)
    }

    async fn acknowledge(&self, connection_id: &ConnectionId, event: RoomEvent) {
        if let Err(e) = self.message_pusher.push_to(connection_id, &event).await {
            tracing::warn!(
                "Failed to acknowledge channel change to '{}': {}",
                connection_id,
                e
            );
        }
    }
}
