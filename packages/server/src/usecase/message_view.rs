//! メッセージの送信者・既読ユーザーをプロフィールに解決する

use std::{collections::HashMap, sync::Arc};

use crate::domain::{Message, MessageView, UserDirectory, UserId, UserProfile};

/// `Message` を配信・一覧用の `MessageView` に変換する
///
/// ディレクトリに存在しないユーザーや、ディレクトリの障害時は
/// ID のみのプロフィール（`UserProfile::unknown`）で補う。
pub struct MessageViewResolver {
    directory: Arc<dyn UserDirectory>,
}

impl MessageViewResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, message: Message) -> MessageView {
        let mut cache = HashMap::new();
        self.resolve_with(message, &mut cache).await
    }

    /// 複数メッセージを解決する（同じユーザーの問い合わせは 1 回にまとめる）
    pub async fn resolve_all(&self, messages: Vec<Message>) -> Vec<MessageView> {
        let mut cache = HashMap::new();
        let mut views = Vec::with_capacity(messages.len());
        for message in messages {
            views.push(self.resolve_with(message, &mut cache).await);
        }
        views
    }

    async fn resolve_with(
        &self,
        message: Message,
        cache: &mut HashMap<UserId, UserProfile>,
    ) -> MessageView {
        let sender = self.profile(&message.sender_id, cache).await;
        let mut read_by = Vec::with_capacity(message.read_by().len());
        for reader in message.read_by() {
            read_by.push(self.profile(reader, cache).await);
        }
        MessageView {
            message,
            sender,
            read_by,
        }
    }

    async fn profile(
        &self,
        user_id: &UserId,
        cache: &mut HashMap<UserId, UserProfile>,
    ) -> UserProfile {
        if let Some(profile) = cache.get(user_id) {
            return profile.clone();
        }
        let profile = match self.directory.profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile::unknown(user_id.clone()),
            Err(e) => {
                tracing::warn!("Failed to resolve profile of '{}': {}", user_id, e);
                UserProfile::unknown(user_id.clone())
            }
        };
        cache.insert(user_id.clone(), profile.clone());
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageContent, MessageId, ProjectId, ProviderError, Timestamp,
        provider::MockUserDirectory,
    };

    fn user(id: &str) -> UserId {
        UserId::try_from(id).unwrap()
    }

    fn message_from(sender: &str) -> Message {
        Message::new(
            MessageId::generate(),
            ProjectId::try_from("p1").unwrap(),
            user(sender),
            MessageContent::from_parts(Some("hi".to_string()), None, None).unwrap(),
            Timestamp::new(1),
        )
    }

    #[tokio::test]
    async fn test_profiles_are_looked_up_once_per_batch() {
        // テスト項目: 同じ送信者のメッセージが複数あってもディレクトリ参照は 1 回
        // given (前提条件):
        let mut directory = MockUserDirectory::new();
        directory.expect_profile().times(1).returning(|id| {
            Ok(Some(UserProfile {
                id: id.clone(),
                username: Some("Alice".to_string()),
            }))
        });
        let resolver = MessageViewResolver::new(Arc::new(directory));

        // when (操作):
        let views = resolver
            .resolve_all(vec![message_from("alice"), message_from("alice")])
            .await;

        // then (期待する結果):
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.sender.display_name() == "Alice"));
        assert_eq!(views[0].read_by[0].username.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_directory_failure_falls_back_to_id() {
        // テスト項目: ディレクトリ障害時は ID のみのプロフィールで補う
        // given (前提条件):
        let mut directory = MockUserDirectory::new();
        directory
            .expect_profile()
            .returning(|_| Err(ProviderError::Unavailable("down".to_string())));
        let resolver = MessageViewResolver::new(Arc::new(directory));

        // when (操作):
        let view = resolver.resolve(message_from("bob")).await;

        // then (期待する結果):
        assert_eq!(view.sender, UserProfile::unknown(user("bob")));
        assert_eq!(view.sender.display_name(), "bob");
    }
}
