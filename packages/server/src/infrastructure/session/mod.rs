//! Session Registry 実装
//!
//! `DashMap`（シャード単位のロック）で接続とチャンネルの対応を管理します。
//! 2 つのマップを同時に触る操作は必ず sessions → channels の順でロックします。

use std::collections::HashSet;

use dashmap::DashMap;

use crate::domain::{
    ChannelId, ConnectionId, Session, SessionError, SessionRegistry, Timestamp, UserId,
};

/// インメモリ Session Registry 実装
#[derive(Default)]
pub struct InMemorySessionRegistry {
    /// 接続 ID → セッション
    sessions: DashMap<ConnectionId, Session>,
    /// チャンネル → 参加中の接続 ID
    channels: DashMap<ChannelId, HashSet<ConnectionId>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続中のセッション数
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// 1 つ以上の接続が参加しているチャンネル数
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn remove_member(&self, channel: &ChannelId, connection_id: &ConnectionId) {
        if let Some(mut members) = self.channels.get_mut(channel) {
            members.remove(connection_id);
        }
        self.channels.remove_if(channel, |_, members| members.is_empty());
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn open(&self, connection_id: ConnectionId, user_id: UserId, connected_at: Timestamp) {
        self.sessions.insert(
            connection_id,
            Session::new(connection_id, user_id, connected_at),
        );
        tracing::debug!("Session '{}' opened", connection_id);
    }

    fn user_of(&self, connection_id: &ConnectionId) -> Option<UserId> {
        self.sessions
            .get(connection_id)
            .map(|session| session.user_id.clone())
    }

    fn join(&self, connection_id: &ConnectionId, channel: ChannelId) -> Result<bool, SessionError> {
        let mut session = self
            .sessions
            .get_mut(connection_id)
            .ok_or_else(|| SessionError::UnknownConnection(connection_id.to_string()))?;

        let newly_joined = session.channels.insert(channel.clone());
        self.channels
            .entry(channel)
            .or_default()
            .insert(*connection_id);

        Ok(newly_joined)
    }

    fn leave(&self, connection_id: &ConnectionId, channel: &ChannelId) -> bool {
        let was_member = match self.sessions.get_mut(connection_id) {
            Some(mut session) => session.channels.remove(channel),
            None => false,
        };
        self.remove_member(channel, connection_id);
        was_member
    }

    fn drop_connection(&self, connection_id: &ConnectionId) -> Vec<ChannelId> {
        let Some((_, session)) = self.sessions.remove(connection_id) else {
            return Vec::new();
        };

        let released: Vec<ChannelId> = session.channels.into_iter().collect();
        for channel in &released {
            self.remove_member(channel, connection_id);
        }
        tracing::debug!(
            "Session '{}' dropped, released {} channel(s)",
            connection_id,
            released.len()
        );
        released
    }

    fn members_of(&self, channel: &ChannelId) -> Vec<ConnectionId> {
        self.channels
            .get(channel)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    fn channels_of(&self, connection_id: &ConnectionId) -> Vec<ChannelId> {
        self.sessions
            .get(connection_id)
            .map(|session| session.channels.iter().cloned().collect())
            .unwrap_or_default()
    }
}
