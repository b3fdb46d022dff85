//! 外部コラボレーター（メンバーシップ・ユーザーディレクトリ）のインメモリ実装
//!
//! 本来はプロジェクト管理・認証システムが提供するデータです。
//! サーバー起動時に JSON ファイルから読み込むか、API で登録します。
//!
//! ```json
//! {
//!   "users": [{ "id": "alice", "username": "Alice" }],
//!   "projects": [{
//!     "projectId": "p1",
//!     "name": "Apollo",
//!     "ownerId": "alice",
//!     "collaborators": [{ "userId": "bob", "role": "editor" }]
//!   }]
//! }
//! ```

use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    MembershipProvider, MembershipSnapshot, ProjectId, ProviderError, UserDirectory, UserId,
    UserProfile,
};

/// ディレクトリファイルの読み込みエラー
#[derive(Debug, Error)]
pub enum DirectoryLoadError {
    #[error("failed to read directory file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse directory file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// ディレクトリファイルの内容
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryData {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub projects: Vec<MembershipSnapshot>,
}

/// インメモリのメンバーシップ・ユーザーディレクトリ
#[derive(Default)]
pub struct InMemoryDirectory {
    users: DashMap<UserId, UserProfile>,
    projects: DashMap<ProjectId, MembershipSnapshot>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: DirectoryData) -> Self {
        let directory = Self::new();
        for user in data.users {
            directory.upsert_user(user);
        }
        for project in data.projects {
            directory.upsert_project(project);
        }
        directory
    }

    /// JSON ファイルから読み込む
    pub async fn load(path: &Path) -> Result<Self, DirectoryLoadError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let data: DirectoryData = serde_json::from_str(&raw)?;
        tracing::info!(
            "Loaded directory from '{}': {} user(s), {} project(s)",
            path.display(),
            data.users.len(),
            data.projects.len()
        );
        Ok(Self::from_data(data))
    }

    pub fn upsert_user(&self, profile: UserProfile) {
        self.users.insert(profile.id.clone(), profile);
    }

    pub fn upsert_project(&self, snapshot: MembershipSnapshot) {
        self.projects.insert(snapshot.project_id.clone(), snapshot);
    }
}

#[async_trait]
impl MembershipProvider for InMemoryDirectory {
    async fn membership(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<MembershipSnapshot>, ProviderError> {
        Ok(self.projects.get(project_id).map(|p| p.clone()))
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, ProviderError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectRole;

    #[tokio::test]
    async fn test_from_json_data() {
        // テスト項目: JSON からユーザーとプロジェクトのメンバー構成を読み込める
        // given (前提条件):
        let json = r#"{
            "users": [{"id": "alice", "username": "Alice"}],
            "projects": [{
                "projectId": "p1",
                "ownerId": "alice",
                "collaborators": [{"userId": "bob", "role": "editor"}, {"userId": "carol"}]
            }]
        }"#;
        let data: DirectoryData = serde_json::from_str(json).unwrap();

        // when (操作):
        let directory = InMemoryDirectory::from_data(data);

        // then (期待する結果):
        let p1 = ProjectId::try_from("p1").unwrap();
        let snapshot = directory.membership(&p1).await.unwrap().unwrap();
        assert_eq!(snapshot.owner_id.as_str(), "alice");
        assert_eq!(snapshot.collaborators[0].role, ProjectRole::Editor);
        assert_eq!(snapshot.collaborators[1].role, ProjectRole::Viewer);

        let alice = UserId::try_from("alice").unwrap();
        let profile = directory.profile(&alice).await.unwrap().unwrap();
        assert_eq!(profile.username.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_unknown_entries_are_none() {
        // テスト項目: 未登録のプロジェクト・ユーザーは None
        // given (前提条件):
        let directory = InMemoryDirectory::new();

        // when (操作):
        let project = directory
            .membership(&ProjectId::try_from("nope").unwrap())
            .await
            .unwrap();
        let user = directory
            .profile(&UserId::try_from("nobody").unwrap())
            .await
            .unwrap();

        // then (期待する結果):
        assert!(project.is_none());
        assert!(user.is_none());
    }

    #[test]
    fn test_invalid_user_id_in_json_is_rejected() {
        // テスト項目: 空の ID を含む JSON はパースエラーになる
        // given (前提条件):
        let json = r#"{"users": [{"id": "  "}]}"#;

        // when (操作):
        let result = serde_json::from_str::<DirectoryData>(json);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
