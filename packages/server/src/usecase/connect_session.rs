//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 接続の登録（Session Registry と MessagePusher の両方）
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続直後はどのチャンネルにも参加していない
//! - 正常系：同じユーザーの複数接続はそれぞれ独立したセッションになる

use std::sync::Arc;

use teamroom_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, PusherChannel, SessionRegistry, Timestamp, UserId,
};

/// 接続済みセッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedSession {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub connected_at: Timestamp,
}

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 接続を登録する
    ///
    /// # Arguments
    ///
    /// * `user_id` - 認証済みのユーザー（ID プロバイダが付与したもの）
    /// * `sender` - 接続の送信キュー
    ///
    /// チャンネルへの参加はクライアントの `join_user` / `join_project` で行う。
    pub async fn execute(&self, user_id: UserId, sender: PusherChannel) -> ConnectedSession {
        let connection_id = ConnectionId::generate();
        let connected_at = Timestamp::new(self.clock.now_millis());

        // 1. Session Registry に登録
        self.registry
            .open(connection_id, user_id.clone(), connected_at);

        // 2. MessagePusher に送信キューを登録
        self.message_pusher
            .register_connection(connection_id, sender)
            .await;

        tracing::info!("'{}' connected as '{}'", user_id, connection_id);
        ConnectedSession {
            connection_id,
            user_id,
            connected_at,
        }
    }
}
