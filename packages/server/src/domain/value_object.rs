//! Value Object 定義
//!
//! 生成時にバリデーションを行い、不正な値を持つインスタンスが存在しないことを保証します。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// 外部システム由来 ID の最大長
pub const MAX_EXTERNAL_ID_LEN: usize = 128;
/// メッセージ本文の最大文字数
pub const MAX_MESSAGE_TEXT_CHARS: usize = 10_000;
/// メディア参照（URL / data URL）の最大バイト数
pub const MAX_MEDIA_REF_BYTES: usize = 32 * 1024 * 1024;
/// 通知本文の最大文字数
pub const MAX_NOTIFICATION_TEXT_CHARS: usize = 1_000;

fn validate_external_id(kind: &'static str, value: String) -> Result<String, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValueObjectError::EmptyId(kind));
    }
    if trimmed.len() > MAX_EXTERNAL_ID_LEN {
        return Err(ValueObjectError::IdTooLong {
            kind,
            max: MAX_EXTERNAL_ID_LEN,
        });
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}

macro_rules! external_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_external_id($kind, value).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

external_id!(
    /// 認証済みユーザーの ID（Identity Provider が発行）
    UserId,
    "user id"
);
external_id!(
    /// プロジェクトの ID（プロジェクト管理システムが発行）
    ProjectId,
    "project id"
);

macro_rules! generated_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// 新しい ID を生成
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl FromStr for $name {
            type Err = ValueObjectError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValueObjectError::InvalidUuid(s.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

generated_id!(
    /// チャットメッセージの ID
    MessageId
);
generated_id!(
    /// 通知の ID
    NotificationId
);
generated_id!(
    /// WebSocket 接続ごとの ID
    ConnectionId
);

/// ブロードキャストの単位となるチャンネル
///
/// テキスト表現は `user:{id}` / `project:{id}`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// ユーザー個人のチャンネル（通知の配信先）
    User(UserId),
    /// プロジェクトのチャットルーム
    Project(ProjectId),
}

impl ChannelId {
    pub fn user(user_id: UserId) -> Self {
        Self::User(user_id)
    }

    pub fn project(project_id: ProjectId) -> Self {
        Self::Project(project_id)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id),
            Self::Project(id) => write!(f, "project:{}", id),
        }
    }
}

impl FromStr for ChannelId {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueObjectError::InvalidChannel(s.to_string());
        let (scope, id) = s.split_once(':').ok_or_else(invalid)?;
        match scope {
            "user" => UserId::try_from(id).map(Self::User).map_err(|_| invalid()),
            "project" => ProjectId::try_from(id)
                .map(Self::Project)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for ChannelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// メッセージ本文（空白のみは不可）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyContent);
        }
        if value.chars().count() > MAX_MESSAGE_TEXT_CHARS {
            return Err(ValueObjectError::TextTooLong {
                max: MAX_MESSAGE_TEXT_CHARS,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// メディアの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// 画像・動画への参照（URL または data URL）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    location: String,
    kind: MediaKind,
}

impl MediaRef {
    pub fn new(location: String, kind: MediaKind) -> Result<Self, ValueObjectError> {
        if location.trim().is_empty() {
            return Err(ValueObjectError::EmptyContent);
        }
        if location.len() > MAX_MEDIA_REF_BYTES {
            return Err(ValueObjectError::MediaTooLarge {
                max: MAX_MEDIA_REF_BYTES,
            });
        }
        Ok(Self { location, kind })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

/// メッセージの内容
///
/// テキスト・メディアのいずれか、または両方を持つ。空の内容は構築できない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(MessageText),
    Media(MediaRef),
    Combined(MessageText, MediaRef),
}

impl MessageContent {
    /// ワイヤ形式の任意フィールド（text / image / video）から構築
    ///
    /// 空白のみのフィールドは未指定として扱う。image と video の同時指定は不可。
    pub fn from_parts(
        text: Option<String>,
        image: Option<String>,
        video: Option<String>,
    ) -> Result<Self, ValueObjectError> {
        let present = |field: Option<String>| field.filter(|v| !v.trim().is_empty());
        let text = present(text).map(MessageText::new).transpose()?;
        let media = match (present(image), present(video)) {
            (Some(_), Some(_)) => return Err(ValueObjectError::MultipleMedia),
            (Some(image), None) => Some(MediaRef::new(image, MediaKind::Image)?),
            (None, Some(video)) => Some(MediaRef::new(video, MediaKind::Video)?),
            (None, None) => None,
        };

        match (text, media) {
            (Some(text), Some(media)) => Ok(Self::Combined(text, media)),
            (Some(text), None) => Ok(Self::Text(text)),
            (None, Some(media)) => Ok(Self::Media(media)),
            (None, None) => Err(ValueObjectError::EmptyContent),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Combined(text, _) => Some(text.as_str()),
            Self::Media(_) => None,
        }
    }

    pub fn media(&self) -> Option<&MediaRef> {
        match self {
            Self::Media(media) | Self::Combined(_, media) => Some(media),
            Self::Text(_) => None,
        }
    }
}

/// 通知の種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// 通知本文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotificationText(String);

impl NotificationText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyNotificationText);
        }
        if value.chars().count() > MAX_NOTIFICATION_TEXT_CHARS {
            return Err(ValueObjectError::NotificationTextTooLong {
                max: MAX_NOTIFICATION_TEXT_CHARS,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix タイムスタンプ（ミリ秒, UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_blank() {
        // テスト項目: 空白のみの UserId は生成できない
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = UserId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyId("user id")));
    }

    #[test]
    fn test_user_id_trims_surrounding_whitespace() {
        // テスト項目: 前後の空白は取り除かれる
        // given (前提条件):
        let raw = " alice ".to_string();

        // when (操作):
        let result = UserId::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(result.as_str(), "alice");
    }

    #[test]
    fn test_project_id_rejects_too_long() {
        // テスト項目: 最大長を超える ProjectId は生成できない
        // given (前提条件):
        let raw = "p".repeat(MAX_EXTERNAL_ID_LEN + 1);

        // when (操作):
        let result = ProjectId::new(raw);

        // then (期待する結果):
        assert!(matches!(result, Err(ValueObjectError::IdTooLong { .. })));
    }

    #[test]
    fn test_channel_id_text_form() {
        // テスト項目: ChannelId のテキスト表現とパースが対応する
        // given (前提条件):
        let user = ChannelId::user(UserId::try_from("alice").unwrap());
        let project = ChannelId::project(ProjectId::try_from("p1").unwrap());

        // when (操作):
        let user_text = user.to_string();
        let project_text = project.to_string();

        // then (期待する結果):
        assert_eq!(user_text, "user:alice");
        assert_eq!(project_text, "project:p1");
        assert_eq!(user_text.parse::<ChannelId>().unwrap(), user);
        assert_eq!(project_text.parse::<ChannelId>().unwrap(), project);
    }

    #[test]
    fn test_channel_id_rejects_unknown_scope() {
        // テスト項目: 未知のスコープや ID 無しのチャンネルはパースできない
        // given (前提条件):
        let inputs = ["room:p1", "project:", "alice"];

        // when (操作) / then (期待する結果):
        for input in inputs {
            assert!(matches!(
                input.parse::<ChannelId>(),
                Err(ValueObjectError::InvalidChannel(_))
            ));
        }
    }

    #[test]
    fn test_content_text_only() {
        // テスト項目: テキストのみの内容は Text になる
        // given (前提条件):
        let text = Some("hi".to_string());

        // when (操作):
        let content = MessageContent::from_parts(text, None, None).unwrap();

        // then (期待する結果):
        assert!(matches!(content, MessageContent::Text(_)));
        assert_eq!(content.text(), Some("hi"));
        assert!(content.media().is_none());
    }

    #[test]
    fn test_content_combined_text_and_video() {
        // テスト項目: テキストと動画の両方を持つ内容は Combined になる
        // given (前提条件):
        let text = Some("look".to_string());
        let video = Some("https://cdn.example/v.mp4".to_string());

        // when (操作):
        let content = MessageContent::from_parts(text, None, video).unwrap();

        // then (期待する結果):
        assert!(matches!(content, MessageContent::Combined(_, _)));
        assert_eq!(content.media().unwrap().kind(), MediaKind::Video);
    }

    #[test]
    fn test_content_blank_fields_are_empty() {
        // テスト項目: 空白のみのフィールドしか無い場合は空の内容として拒否される
        // given (前提条件):
        let text = Some("  ".to_string());
        let image = Some(String::new());

        // when (操作):
        let result = MessageContent::from_parts(text, image, None);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyContent));
    }

    #[test]
    fn test_content_rejects_image_and_video_together() {
        // テスト項目: 画像と動画の同時指定は拒否される
        // given (前提条件):
        let image = Some("data:image/png;base64,AAAA".to_string());
        let video = Some("https://cdn.example/v.mp4".to_string());

        // when (操作):
        let result = MessageContent::from_parts(None, image, video);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::MultipleMedia));
    }

    #[test]
    fn test_message_text_rejects_too_long() {
        // テスト項目: 最大文字数を超えるテキストは拒否される
        // given (前提条件):
        let text = "あ".repeat(MAX_MESSAGE_TEXT_CHARS + 1);

        // when (操作):
        let result = MessageText::new(text);

        // then (期待する結果):
        assert!(matches!(result, Err(ValueObjectError::TextTooLong { .. })));
    }

    #[test]
    fn test_notification_text_rejects_blank() {
        // テスト項目: 空の通知本文は拒否される
        // given (前提条件):
        let text = "\n".to_string();

        // when (操作):
        let result = NotificationText::new(text);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyNotificationText));
    }

    #[test]
    fn test_message_id_parse() {
        // テスト項目: 生成した MessageId は文字列表現から復元できる
        // given (前提条件):
        let id = MessageId::generate();

        // when (操作):
        let parsed: MessageId = id.to_string().parse().unwrap();

        // then (期待する結果):
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<MessageId>().is_err());
    }
}
