//! チャンネルに配信されるイベントと、通知の契機となるドメインイベント

use serde::{Deserialize, Serialize};

use super::{
    entity::{MessageView, Notification},
    value_object::{ChannelId, MessageId, ProjectId, UserId},
};

/// ブロードキャストバスで配信されるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// 新しいメッセージ（`receive_message`）
    MessageReceived(MessageView),
    /// メッセージ削除の tombstone（`message_deleted`）
    MessageDeleted { message_id: MessageId },
    /// 既読状態の更新（`messages_read`）
    MessagesRead {
        reader_id: UserId,
        message_ids: Vec<MessageId>,
    },
    /// 新しい通知（`new_notification`）
    NotificationCreated(Notification),
    /// チャンネル参加の確認（接続単位）
    ChannelJoined(ChannelId),
    /// チャンネル離脱の確認（接続単位）
    ChannelLeft(ChannelId),
    /// 受信イベントの拒否（接続単位）
    Rejected { code: String, message: String },
}

/// 通知のファンアウトを引き起こすドメインイベント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    MessageSent {
        project_id: ProjectId,
        sender_id: UserId,
    },
    TaskAssigned {
        project_id: ProjectId,
        assigner_id: UserId,
        assignee_id: UserId,
        task_title: String,
    },
    ProjectJoined {
        project_id: ProjectId,
        joiner_id: UserId,
    },
    ProjectCompleted {
        project_id: ProjectId,
        actor_id: UserId,
    },
}

impl DomainEvent {
    pub fn project_id(&self) -> &ProjectId {
        match self {
            Self::MessageSent { project_id, .. }
            | Self::TaskAssigned { project_id, .. }
            | Self::ProjectJoined { project_id, .. }
            | Self::ProjectCompleted { project_id, .. } => project_id,
        }
    }

    /// イベントを起こしたユーザー（自分自身には通知しない）
    pub fn actor_id(&self) -> &UserId {
        match self {
            Self::MessageSent { sender_id, .. } => sender_id,
            Self::TaskAssigned { assigner_id, .. } => assigner_id,
            Self::ProjectJoined { joiner_id, .. } => joiner_id,
            Self::ProjectCompleted { actor_id, .. } => actor_id,
        }
    }
}
