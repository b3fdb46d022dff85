//! プロジェクトメンバーシップの確認
//!
//! チャンネル参加・既読・一覧取得の前に、利用者がプロジェクトのメンバーかを確認します。
//! `enforce` が無効の場合は非メンバーでも処理を続け、警告ログだけを残します。

use std::sync::Arc;

use crate::domain::{MembershipProvider, ProjectId, UserId};

use super::error::MembershipError;

pub struct MembershipGuard {
    provider: Arc<dyn MembershipProvider>,
    enforce: bool,
}

impl MembershipGuard {
    pub fn new(provider: Arc<dyn MembershipProvider>, enforce: bool) -> Self {
        Self { provider, enforce }
    }

    /// `user_id` が `project_id` のメンバーであることを確認する
    ///
    /// # Arguments
    ///
    /// * `action` - ログに残す操作名（例: "join_project"）
    pub async fn check(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        action: &str,
    ) -> Result<(), MembershipError> {
        let is_member = match self.provider.membership(project_id).await {
            Ok(snapshot) => snapshot.is_some_and(|s| s.is_member(user_id)),
            Err(e) if self.enforce => return Err(e.into()),
            Err(e) => {
                tracing::warn!(
                    "Membership lookup for '{}' failed during {}: {}; continuing",
                    project_id,
                    action,
                    e
                );
                return Ok(());
            }
        };

        if is_member {
            return Ok(());
        }
        if self.enforce {
            tracing::info!(
                "Rejected {} by '{}': not a member of project '{}'",
                action,
                user_id,
                project_id
            );
            return Err(MembershipError::NotMember {
                user: user_id.to_string(),
                project: project_id.to_string(),
            });
        }

        tracing::warn!(
            "'{}' performed {} on project '{}' without being a member (membership not enforced)",
            user_id,
            action,
            project_id
        );
        Ok(())
    }
}
