use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::application::ports::{ActionReplayer, ConnectivityProbe};
use crate::application::services::action_queue::ActionQueue;
use crate::domain::entities::ActionKind;
use crate::shared::classify::ConnectivityStatus;
use crate::shared::config::ReplayPolicy;
use crate::shared::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatusSnapshot {
    pub is_syncing: bool,
    pub pending_actions: u32,
    pub last_sync: Option<i64>,
    pub sync_errors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub attempted: u32,
    pub replayed: u32,
    pub failed: u32,
    pub remaining: u32,
}

/// 接続回復時にキューを再生するリコンサイラ。
///
/// Replays run in creation order; a successful replay removes the action,
/// a failed one leaves it in place (at-least-once toward the backend).
pub struct SyncService {
    queue: Arc<ActionQueue>,
    probe: Arc<dyn ConnectivityProbe>,
    handlers: RwLock<HashMap<ActionKind, Arc<dyn ActionReplayer>>>,
    status: Arc<RwLock<SyncStatusSnapshot>>,
    policy: ReplayPolicy,
}

impl SyncService {
    pub fn new(
        queue: Arc<ActionQueue>,
        probe: Arc<dyn ConnectivityProbe>,
        policy: ReplayPolicy,
    ) -> Self {
        Self {
            queue,
            probe,
            handlers: RwLock::new(HashMap::new()),
            status: Arc::new(RwLock::new(SyncStatusSnapshot {
                is_syncing: false,
                pending_actions: 0,
                last_sync: None,
                sync_errors: 0,
            })),
            policy,
        }
    }

    /// アクション種別に対応する外部書き込みハンドラを登録する。
    pub async fn register_handler(&self, kind: ActionKind, handler: Arc<dyn ActionReplayer>) {
        let mut handlers = self.handlers.write().await;
        handlers.insert(kind, handler);
    }

    pub async fn status(&self) -> SyncStatusSnapshot {
        self.status.read().await.clone()
    }

    pub async fn pending_count(&self) -> u32 {
        self.queue.list().await.len() as u32
    }

    /// 保留中のアクションを順に再生する。
    ///
    /// Skips entirely while the probe reports Offline, and while another
    /// drain is in flight.
    pub async fn sync_pending(&self) -> Result<ReplayReport> {
        if self.probe.status().await == ConnectivityStatus::Offline {
            let remaining = self.pending_count().await;
            let mut status = self.status.write().await;
            status.pending_actions = remaining;
            return Ok(ReplayReport {
                remaining,
                ..ReplayReport::default()
            });
        }

        {
            let mut status = self.status.write().await;
            if status.is_syncing {
                return Ok(ReplayReport {
                    remaining: status.pending_actions,
                    ..ReplayReport::default()
                });
            }
            status.is_syncing = true;
        }

        let report = self.drain().await;

        let mut status = self.status.write().await;
        status.is_syncing = false;
        status.last_sync = Some(chrono::Utc::now().timestamp());
        status.pending_actions = report.remaining;
        status.sync_errors += report.failed;

        Ok(report)
    }

    async fn drain(&self) -> ReplayReport {
        let actions = self.queue.list().await;
        let mut report = ReplayReport::default();

        for action in &actions {
            report.attempted += 1;

            let handler = {
                let handlers = self.handlers.read().await;
                handlers.get(&action.kind()).cloned()
            };

            let outcome = match handler {
                Some(handler) => handler.replay(&action.user_id, &action.payload).await,
                None => Err(AppError::Internal(format!(
                    "no replay handler registered for {}",
                    action.kind()
                ))),
            };

            match outcome {
                Ok(()) => {
                    // A remove failure leaves the action for a duplicate
                    // replay later; the write itself already landed.
                    if let Err(err) = self.queue.remove(&action.id).await {
                        tracing::warn!("replayed action {} not removed: {err}", action.id);
                    }
                    report.replayed += 1;
                }
                Err(err) => {
                    tracing::warn!("replay failed for action {}: {err}", action.id);
                    report.failed += 1;
                    if self.policy == ReplayPolicy::StopOnFirstFailure {
                        break;
                    }
                }
            }
        }

        report.remaining = self.queue.list().await.len() as u32;
        report
    }

    /// 定期同期タスクを起動する。
    pub fn schedule_sync(self: &Arc<Self>, interval_secs: u64) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));

            loop {
                interval.tick().await;

                if let Err(e) = service.sync_pending().await {
                    tracing::error!("Scheduled sync error: {}", e);
                }
            }
        });
    }
}
