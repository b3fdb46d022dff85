//! UseCase: セッション切断処理
//!
//! 切断時は参加中の全チャンネルから外し、送信キューを登録解除します。
//! 切断後の publish はこの接続に届きません。

use std::sync::Arc;

use crate::domain::{ChannelId, ConnectionId, MessagePusher, SessionRegistry};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 解放したチャンネル（未知の接続なら空）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<ChannelId> {
        // 1. 全チャンネルから離脱（以降の publish の対象外になる）
        let released = self.registry.drop_connection(connection_id);

        // 2. 送信キューを登録解除
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        tracing::info!(
            "Connection '{}' closed, released {} channel(s)",
            connection_id,
            released.len()
        );
        released
    }
}
