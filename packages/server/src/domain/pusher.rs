//! Session Registry と Room Broadcast Bus のインターフェース

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ChannelId, ConnectionId, MessagePushError, RoomEvent, SessionError, Timestamp, UserId};

/// 接続ごとの送信キュー（容量制限あり）
pub type PusherChannel = mpsc::Sender<String>;

/// 1 回の publish の配信結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// 送信キューに積めた接続数
    pub delivered: usize,
    /// キュー満杯・切断済みで破棄した接続数
    pub dropped: usize,
}

/// 接続とユーザー・参加チャンネルの対応を管理する
///
/// 全ての操作は他の接続をブロックしない（ロックはシャード単位）。
pub trait SessionRegistry: Send + Sync {
    /// 接続を認証済みユーザーに紐付けて登録する
    fn open(&self, connection_id: ConnectionId, user_id: UserId, connected_at: Timestamp);

    /// 接続のユーザー
    fn user_of(&self, connection_id: &ConnectionId) -> Option<UserId>;

    /// チャンネルに参加する（冪等）。新たに参加した場合 `true`
    fn join(&self, connection_id: &ConnectionId, channel: ChannelId) -> Result<bool, SessionError>;

    /// チャンネルから離脱する。参加していた場合 `true`
    fn leave(&self, connection_id: &ConnectionId, channel: &ChannelId) -> bool;

    /// 接続を削除し、参加していた全チャンネルから外す
    fn drop_connection(&self, connection_id: &ConnectionId) -> Vec<ChannelId>;

    /// チャンネルに参加中の接続
    fn members_of(&self, channel: &ChannelId) -> Vec<ConnectionId>;

    /// 接続が参加中のチャンネル
    fn channels_of(&self, connection_id: &ConnectionId) -> Vec<ChannelId>;
}

/// チャンネル単位のブロードキャストバス
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信キューを登録解除
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 単一の接続にイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// チャンネルに参加中の全接続（`exclude` を除く）にイベントを配信
    ///
    /// 個々の接続への失敗は配信全体を失敗させない。
    async fn publish(
        &self,
        channel: &ChannelId,
        event: &RoomEvent,
        exclude: Option<&ConnectionId>,
    ) -> Result<PublishReport, MessagePushError>;
}
