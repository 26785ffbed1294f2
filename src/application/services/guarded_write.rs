use std::future::Future;
use std::sync::Arc;

use crate::application::ports::ConnectivityProbe;
use crate::application::services::action_queue::ActionQueue;
use crate::domain::entities::{ActionDraft, OfflineAction};
use crate::infrastructure::events::{ErrorBus, OperationKind, PermissionErrorEvent};
use crate::shared::classify::{is_offline_failure, is_permission_failure};
use crate::shared::config::PermissionHandling;
use crate::shared::error::{AppError, Result};
use crate::shared::retry::{with_retry, RetryPolicy};

/// 保護された書き込みの結果。
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// 外部書き込みがそのまま成功した。
    Completed,
    /// オフラインと判定され、キューに退避された。
    Queued(OfflineAction),
    /// 権限拒否。バスへ通知済みで、呼び出し元には伝播しない（lenient時）。
    Denied,
}

/// UI起点の書き込みを試み、失敗を分類して退避・通知・伝播に振り分ける。
pub struct GuardedWriteService {
    queue: Arc<ActionQueue>,
    probe: Arc<dyn ConnectivityProbe>,
    error_bus: Arc<ErrorBus>,
    retry: RetryPolicy,
    permission_handling: PermissionHandling,
}

impl GuardedWriteService {
    pub fn new(
        queue: Arc<ActionQueue>,
        probe: Arc<dyn ConnectivityProbe>,
        error_bus: Arc<ErrorBus>,
        retry: RetryPolicy,
        permission_handling: PermissionHandling,
    ) -> Self {
        Self {
            queue,
            probe,
            error_bus,
            retry,
            permission_handling,
        }
    }

    /// 外部書き込みを一度だけ試みる。
    ///
    /// Offline failures are absorbed into the queue and never surface as
    /// errors. Permission failures go through the bus and, depending on
    /// the configured handling, are either re-raised (strict) or logged
    /// and reported as `Denied` (lenient). Everything else returns to the
    /// caller unchanged.
    pub async fn execute<F, Fut>(
        &self,
        draft: ActionDraft,
        resource_path: &str,
        operation: OperationKind,
        write: F,
    ) -> Result<WriteOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        match write().await {
            Ok(()) => Ok(WriteOutcome::Completed),
            Err(err) => self.absorb(draft, resource_path, operation, err).await,
        }
    }

    /// 設定されたリトライポリシーで書き込みを包んでから分類する。
    ///
    /// Retries are unconditional, so even a permission denial is retried
    /// to exhaustion before being routed — see the design notes.
    pub async fn execute_with_retry<F, Fut>(
        &self,
        draft: ActionDraft,
        resource_path: &str,
        operation: OperationKind,
        write: F,
    ) -> Result<WriteOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        match with_retry(self.retry, write).await {
            Ok(()) => Ok(WriteOutcome::Completed),
            Err(err) => self.absorb(draft, resource_path, operation, err).await,
        }
    }

    async fn absorb(
        &self,
        draft: ActionDraft,
        resource_path: &str,
        operation: OperationKind,
        err: AppError,
    ) -> Result<WriteOutcome> {
        let connectivity = self.probe.status().await;

        if is_offline_failure(Some(&err), connectivity) {
            let action = self.queue.enqueue(draft).await;
            tracing::info!(
                "write deferred while offline: {} ({})",
                action.id,
                action.kind()
            );
            return Ok(WriteOutcome::Queued(action));
        }

        if is_permission_failure(&err) {
            self.error_bus.permission.emit(&PermissionErrorEvent {
                path: resource_path.to_string(),
                operation,
                message: err.to_string(),
            });
            return match self.permission_handling {
                PermissionHandling::Strict => Err(err),
                PermissionHandling::Lenient => {
                    tracing::warn!("permission denied on {operation} {resource_path}: {err}");
                    Ok(WriteOutcome::Denied)
                }
            };
        }

        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ActionPayload;
    use crate::domain::value_objects::UserId;
    use crate::infrastructure::connectivity::SharedConnectivityFlag;
    use crate::infrastructure::storage::MemoryKeyValueStore;
    use crate::shared::classify::ConnectivityStatus;
    use crate::shared::error::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct Harness {
        service: GuardedWriteService,
        queue: Arc<ActionQueue>,
        bus: Arc<ErrorBus>,
        flag: Arc<SharedConnectivityFlag>,
    }

    fn harness(handling: PermissionHandling) -> Harness {
        let queue = Arc::new(ActionQueue::new(Arc::new(MemoryKeyValueStore::default())));
        let bus = Arc::new(ErrorBus::new());
        let flag = Arc::new(SharedConnectivityFlag::new(ConnectivityStatus::Online));
        let service = GuardedWriteService::new(
            queue.clone(),
            flag.clone(),
            bus.clone(),
            RetryPolicy::new(2, 5),
            handling,
        );
        Harness {
            service,
            queue,
            bus,
            flag,
        }
    }

    fn vital_draft() -> ActionDraft {
        ActionDraft::new(
            UserId::parse("user-1").unwrap(),
            ActionPayload::CreateVitalReading {
                kind: "blood_pressure".to_string(),
                value: 120.0,
                unit: "mmHg".to_string(),
                measured_at_ms: 1_751_300_000_000,
            },
        )
    }

    #[tokio::test]
    async fn test_successful_write_completes() {
        let h = harness(PermissionHandling::Lenient);

        let outcome = h
            .service
            .execute(vital_draft(), "vitals", OperationKind::Create, || async {
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Completed);
        assert!(h.queue.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_offline_failure_is_queued_not_raised() {
        let h = harness(PermissionHandling::Lenient);
        h.flag.set(ConnectivityStatus::Offline).await;

        let outcome = h
            .service
            .execute(vital_draft(), "vitals", OperationKind::Create, || async {
                Err(AppError::Internal("socket closed".to_string()))
            })
            .await
            .unwrap();

        match outcome {
            WriteOutcome::Queued(action) => {
                let pending = h.queue.list().await;
                assert_eq!(pending, vec![action]);
            }
            other => panic!("expected queued outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transient_backend_code_queues_even_while_online() {
        let h = harness(PermissionHandling::Lenient);

        let outcome = h
            .service
            .execute(vital_draft(), "vitals", OperationKind::Create, || async {
                Err(AppError::unavailable("backend 503"))
            })
            .await
            .unwrap();

        assert!(matches!(outcome, WriteOutcome::Queued(_)));
        assert_eq!(h.queue.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_permission_failure_lenient_emits_and_continues() {
        let h = harness(PermissionHandling::Lenient);
        let events: Arc<Mutex<Vec<PermissionErrorEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let _guard = h
            .bus
            .permission
            .subscribe_scoped(move |event| sink.lock().unwrap().push(event.clone()));

        let outcome = h
            .service
            .execute(
                vital_draft(),
                "vitals/v-9",
                OperationKind::Update,
                || async { Err(AppError::permission_denied("not the owner")) },
            )
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Denied);
        assert!(h.queue.list().await.is_empty());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, "vitals/v-9");
        assert_eq!(events[0].operation, OperationKind::Update);
    }

    #[tokio::test]
    async fn test_permission_failure_strict_reraises_after_emitting() {
        let h = harness(PermissionHandling::Strict);
        let count = Arc::new(AtomicU32::new(0));
        let sink = count.clone();
        let _guard = h.bus.permission.subscribe_scoped(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        let result = h
            .service
            .execute(vital_draft(), "vitals", OperationKind::Create, || async {
                Err(AppError::permission_denied("not the owner"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generic_failure_propagates_unchanged() {
        let h = harness(PermissionHandling::Lenient);

        let result = h
            .service
            .execute(vital_draft(), "vitals", OperationKind::Create, || async {
                Err(AppError::Validation("value out of range".to_string()))
            })
            .await;

        match result {
            Err(AppError::Validation(message)) => assert_eq!(message, "value out of range"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(h.queue.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_execute_with_retry_recovers_before_classifying() {
        let h = harness(PermissionHandling::Lenient);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let outcome = h
            .service
            .execute_with_retry(vital_draft(), "vitals", OperationKind::Create, move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(AppError::unavailable("first attempt"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(h.queue.list().await.is_empty());
    }
}
