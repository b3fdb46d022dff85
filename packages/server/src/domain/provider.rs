//! 外部コラボレーター（プロジェクト管理・ユーザー管理）へのインターフェース

use async_trait::async_trait;

use super::{MembershipSnapshot, ProjectId, ProviderError, UserId, UserProfile};

/// プロジェクトのメンバー構成を提供する
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// プロジェクトが存在しなければ `Ok(None)`
    async fn membership(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<MembershipSnapshot>, ProviderError>;
}

/// ユーザー名を解決する
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, ProviderError>;
}
