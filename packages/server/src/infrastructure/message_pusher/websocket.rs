//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの送信キュー（`PusherChannel`）を管理
//! - Session Registry が返すチャンネル参加者へのイベント配信
//!
//! ## 設計ノート
//!
//! WebSocket の生成と送信キューの作成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装はキューへの投入だけを行い、ソケットへの書き込みは接続ごとの
//! pusher タスクが担当します。キューは容量制限付きで、満杯の接続にはイベントを
//! 破棄して警告を出します。publisher が遅い接続を待つことはありません。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc::error::TrySendError;

use crate::{
    domain::{
        ChannelId, ConnectionId, MessagePushError, MessagePusher, PublishReport, PusherChannel,
        RoomEvent, SessionRegistry,
    },
    infrastructure::dto::websocket::ServerEvent,
};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続 ID → 送信キュー
    senders: DashMap<ConnectionId, PusherChannel>,
    /// チャンネル参加者の解決に使う
    registry: Arc<dyn SessionRegistry>,
}

impl WebSocketMessagePusher {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self {
            senders: DashMap::new(),
            registry,
        }
    }

    fn encode(event: &RoomEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerEvent::from(event))
            .map_err(|e| MessagePushError::Encode(e.to_string()))
    }

    /// 送信キューに積む（待たない）
    fn enqueue(&self, connection_id: &ConnectionId, payload: String) -> Result<(), MessagePushError> {
        let sender = self
            .senders
            .get(connection_id)
            .map(|s| s.clone())
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;

        sender.try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => MessagePushError::PushFailed("outbound queue full".to_string()),
            TrySendError::Closed(_) => {
                MessagePushError::PushFailed("connection closed".to_string())
            }
        })
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.senders.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        self.senders.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(event)?;
        self.enqueue(connection_id, payload)?;
        tracing::debug!("Pushed event to connection '{}'", connection_id);
        Ok(())
    }

    async fn publish(
        &self,
        channel: &ChannelId,
        event: &RoomEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<PublishReport, MessagePushError> {
        let payload = Self::encode(event)?;
        let mut report = PublishReport::default();

        for target in self.registry.members_of(channel) {
            if Some(&target) == exclude {
                continue;
            }
            // 一部の接続への送信失敗は許容する
            match self.enqueue(&target, payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.dropped += 1;
                    tracing::warn!(
                        "Dropped event on '{}' for connection '{}': {}",
                        channel,
                        target,
                        e
                    );
                }
            }
        }

        tracing::debug!(
            "Published to '{}': delivered={}, dropped={}",
            channel,
            report.delivered,
            report.dropped
        );
        Ok(report)
    }
}
