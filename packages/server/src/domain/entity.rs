//! Entity 定義

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::value_object::{
    ChannelId, ConnectionId, MessageContent, MessageId, NotificationId, NotificationKind,
    NotificationText, ProjectId, Timestamp, UserId,
};

/// プロジェクトのチャットメッセージ
///
/// `read_by` は作成時点から送信者を含み、削除されるまで単調に増加する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub project_id: ProjectId,
    pub sender_id: UserId,
    pub content: MessageContent,
    read_by: Vec<UserId>,
    pub created_at: Timestamp,
}

impl Message {
    pub fn new(
        id: MessageId,
        project_id: ProjectId,
        sender_id: UserId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            project_id,
            read_by: vec![sender_id.clone()],
            sender_id,
            content,
            created_at,
        }
    }

    /// 既読ユーザー（既読になった順）
    pub fn read_by(&self) -> &[UserId] {
        &self.read_by
    }

    pub fn is_read_by(&self, user_id: &UserId) -> bool {
        self.read_by.contains(user_id)
    }

    /// 既読ユーザーを追加する（未追加の場合のみ）
    ///
    /// 追加した場合 `true` を返す。
    pub fn add_reader(&mut self, user_id: &UserId) -> bool {
        if self.is_read_by(user_id) {
            return false;
        }
        self.read_by.push(user_id.clone());
        true
    }
}

/// ユーザー宛ての通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub message: NotificationText,
    pub kind: NotificationKind,
    pub read: bool,
    pub link: Option<String>,
    pub created_at: Timestamp,
}

/// 受信者を含まない通知の雛形（ファンアウトで受信者ごとに展開する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTemplate {
    pub message: NotificationText,
    pub kind: NotificationKind,
    pub link: Option<String>,
}

/// 永続化前の通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub message: NotificationText,
    pub kind: NotificationKind,
    pub link: Option<String>,
}

impl NotificationTemplate {
    pub fn for_recipient(&self, recipient_id: UserId) -> NewNotification {
        NewNotification {
            recipient_id,
            message: self.message.clone(),
            kind: self.kind,
            link: self.link.clone(),
        }
    }
}

/// プロジェクト内のロール
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Editor,
    #[default]
    Viewer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user_id: UserId,
    #[serde(default)]
    pub role: ProjectRole,
}

/// 外部のプロジェクト管理システムから取得するメンバー構成（読み取り専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSnapshot {
    pub project_id: ProjectId,
    #[serde(default)]
    pub name: Option<String>,
    pub owner_id: UserId,
    #[serde(default)]
    pub collaborators: Vec<ProjectMember>,
}

impl MembershipSnapshot {
    pub fn is_member(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id || self.collaborators.iter().any(|m| &m.user_id == user_id)
    }

    /// オーナーと全コラボレーターから `actor` を除いた通知対象
    ///
    /// オーナーを先頭に、重複なしで返す。
    pub fn recipients_excluding(&self, actor: &UserId) -> Vec<UserId> {
        let mut seen = HashSet::new();
        std::iter::once(&self.owner_id)
            .chain(self.collaborators.iter().map(|m| &m.user_id))
            .filter(|id| *id != actor)
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect()
    }

    /// 通知文面に使うプロジェクト表示名
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.project_id.as_str())
    }
}

/// ユーザーディレクトリのプロフィール
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
}

impl UserProfile {
    /// ディレクトリに存在しないユーザー
    pub fn unknown(id: UserId) -> Self {
        Self { id, username: None }
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(self.id.as_str())
    }
}

/// 送信者と既読ユーザーを解決済みのメッセージ（配信・一覧用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub message: Message,
    pub sender: UserProfile,
    pub read_by: Vec<UserProfile>,
}

/// 接続中のセッション（永続化しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub channels: HashSet<ChannelId>,
    pub connected_at: Timestamp,
}

impl Session {
    pub fn new(connection_id: ConnectionId, user_id: UserId, connected_at: Timestamp) -> Self {
        Self {
            connection_id,
            user_id,
            channels: HashSet::new(),
            connected_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    fn member(id: &str) -> ProjectMember {
        ProjectMember {
            user_id: user(id),
            role: ProjectRole::Viewer,
        }
    }

    fn text(value: &str) -> MessageContent {
        MessageContent::from_parts(Some(value.to_string()), None, None).unwrap()
    }

    #[test]
    fn test_new_message_is_read_by_sender() {
        // テスト項目: 作成直後のメッセージは送信者が既読に含まれる
        // given (前提条件):
        let alice = user("alice");

        // when (操作):
        let message = Message::new(
            MessageId::generate(),
            ProjectId::try_from("p1").unwrap(),
            alice.clone(),
            text("hi"),
            Timestamp::new(1),
        );

        // then (期待する結果):
        assert_eq!(message.read_by(), &[alice]);
    }

    #[test]
    fn test_add_reader_is_idempotent() {
        // テスト項目: 同じユーザーを 2 回追加しても既読は 1 件だけ増える
        // given (前提条件):
        let mut message = Message::new(
            MessageId::generate(),
            ProjectId::try_from("p1").unwrap(),
            user("alice"),
            text("hi"),
            Timestamp::new(1),
        );

        // when (操作):
        let first = message.add_reader(&user("bob"));
        let second = message.add_reader(&user("bob"));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(message.read_by(), &[user("alice"), user("bob")]);
    }

    #[test]
    fn test_recipients_exclude_actor() {
        // テスト項目: 通知対象はオーナーとコラボレーターからアクターを除いたもの
        // given (前提条件):
        let snapshot = MembershipSnapshot {
            project_id: ProjectId::try_from("p1").unwrap(),
            name: None,
            owner_id: user("owner"),
            collaborators: vec![member("a"), member("b"), member("c")],
        };

        // when (操作):
        let recipients = snapshot.recipients_excluding(&user("a"));

        // then (期待する結果):
        assert_eq!(recipients, vec![user("owner"), user("b"), user("c")]);
    }

    #[test]
    fn test_recipients_deduplicate_owner_listed_as_collaborator() {
        // テスト項目: オーナーがコラボレーターにも含まれていても通知対象は重複しない
        // given (前提条件):
        let snapshot = MembershipSnapshot {
            project_id: ProjectId::try_from("p1").unwrap(),
            name: Some("Apollo".to_string()),
            owner_id: user("owner"),
            collaborators: vec![member("owner"), member("b"), member("b")],
        };

        // when (操作):
        let recipients = snapshot.recipients_excluding(&user("z"));

        // then (期待する結果):
        assert_eq!(recipients, vec![user("owner"), user("b")]);
        assert_eq!(snapshot.display_name(), "Apollo");
    }
}
