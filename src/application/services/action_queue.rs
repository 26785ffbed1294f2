use std::sync::Arc;

use chrono::Utc;

use crate::application::ports::KeyValueStore;
use crate::domain::entities::{ActionDraft, OfflineAction};
use crate::domain::value_objects::ActionId;
use crate::shared::error::Result;

pub const DEFAULT_QUEUE_KEY: &str = "kaigo.offline_queue";

/// 遅延書き込みの永続キュー。ストアの1キーをJSON配列として占有する。
///
/// The queue is the only component allowed to touch its storage key.
/// Every mutation is a read-modify-write over the whole snapshot, so
/// concurrent mutations from independent contexts are last-writer-wins.
pub struct ActionQueue {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ActionQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_QUEUE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// id とタイムスタンプを採番して永続化し、保存済みアクションを返す。
    ///
    /// Timestamps are clamped to be >= the newest stored action so that
    /// enqueue order and timestamp order agree within one context. If the
    /// store is unreadable or unwritable the action is dropped with a
    /// warning instead of raising (documented lossy degradation) — an
    /// unreadable snapshot is never overwritten blind.
    pub async fn enqueue(&self, draft: ActionDraft) -> OfflineAction {
        let now = Utc::now().timestamp_millis();

        let mut actions = match self.store.get(&self.key).await {
            Ok(raw) => Self::decode(raw),
            Err(err) => {
                let action = Self::build(draft, now);
                tracing::warn!(
                    "offline action {} dropped, queue store unreadable: {err}",
                    action.id
                );
                return action;
            }
        };

        let created_at_ms = actions
            .iter()
            .map(|a| a.created_at_ms)
            .max()
            .map_or(now, |newest| now.max(newest));
        let action = Self::build(draft, created_at_ms);

        actions.push(action.clone());
        if let Err(err) = self.write_all(&actions).await {
            tracing::warn!(
                "offline action {} dropped, queue store unwritable: {err}",
                action.id
            );
        }

        action
    }

    /// 作成タイムスタンプ昇順の全アクション。読めない場合は空を返す。
    pub async fn list(&self) -> Vec<OfflineAction> {
        let mut actions = match self.store.get(&self.key).await {
            Ok(raw) => Self::decode(raw),
            Err(err) => {
                tracing::warn!("queue store unreadable, treating queue as empty: {err}");
                Vec::new()
            }
        };
        // Stable sort keeps enqueue order for equal timestamps.
        actions.sort_by_key(|a| a.created_at_ms);
        actions
    }

    /// 該当 id を削除する。存在しない場合は何もしない。
    pub async fn remove(&self, id: &ActionId) -> Result<()> {
        let raw = self.store.get(&self.key).await?;
        let mut actions = Self::decode(raw);
        let before = actions.len();
        actions.retain(|a| &a.id != id);
        if actions.len() == before {
            return Ok(());
        }
        self.write_all(&actions).await
    }

    /// キューを無条件に空にする。
    pub async fn clear(&self) -> Result<()> {
        self.store.set(&self.key, "[]").await
    }

    fn build(draft: ActionDraft, created_at_ms: i64) -> OfflineAction {
        OfflineAction {
            id: ActionId::generate(),
            user_id: draft.user_id,
            created_at_ms,
            payload: draft.payload,
        }
    }

    fn decode(raw: Option<String>) -> Vec<OfflineAction> {
        let Some(raw) = raw else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<OfflineAction>>(&raw) {
            Ok(actions) => actions,
            Err(err) => {
                tracing::warn!("corrupted queue content, treating queue as empty: {err}");
                Vec::new()
            }
        }
    }

    async fn write_all(&self, actions: &[OfflineAction]) -> Result<()> {
        let serialized = serde_json::to_string(actions)?;
        self.store.set(&self.key, &serialized).await
    }
}
