//! Read-Receipt Tracker
//!
//! メッセージごとの既読ユーザー集合を Message Store の add-if-absent で更新します。
//! 同じメッセージに対する同時の既読要求でも、ユーザーは 1 回だけ追加されます。

use std::{collections::HashSet, sync::Arc};

use crate::domain::{MessageId, MessageRepository, ReadReceiptUpdate, RepositoryError, UserId};

pub struct ReadReceiptTracker {
    repository: Arc<dyn MessageRepository>,
}

impl ReadReceiptTracker {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// `reader_id` を各メッセージの既読に追加する
    ///
    /// 重複した ID は 1 回だけ処理し、存在しない（削除済みの）メッセージは読み飛ばす。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ReadReceiptUpdate>)` - 存在したメッセージごとの結果（入力順）
    /// * `Err(RepositoryError)` - ストア障害（それまでの更新は保持される）
    pub async fn mark_read(
        &self,
        message_ids: &[MessageId],
        reader_id: &UserId,
    ) -> Result<Vec<ReadReceiptUpdate>, RepositoryError> {
        let mut seen = HashSet::new();
        let mut updates = Vec::new();

        for message_id in message_ids.iter().filter(|id| seen.insert(**id)) {
            match self
                .repository
                .add_reader_if_absent(message_id, reader_id)
                .await
            {
                Ok(update) => updates.push(update),
                Err(RepositoryError::MessageNotFound(_)) => {
                    tracing::debug!("Skipped read receipt for missing message '{}'", message_id);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(updates)
    }
}
