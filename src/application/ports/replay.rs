use async_trait::async_trait;

use crate::domain::entities::ActionPayload;
use crate::domain::value_objects::UserId;
use crate::shared::error::Result;

/// アクション種別ごとの外部書き込みオペレーション。
///
/// Replays are at-least-once: a handler may be invoked more than once for
/// the same logical action and must tolerate that.
#[async_trait]
pub trait ActionReplayer: Send + Sync {
    async fn replay(&self, user_id: &UserId, payload: &ActionPayload) -> Result<()>;
}
