pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{ActionReplayer, ConnectivityProbe, KeyValueStore};
pub use application::services::{
    ActionQueue, GuardedWriteService, ReplayReport, SyncService, SyncStatusSnapshot, WriteOutcome,
};
pub use domain::entities::{ActionDraft, ActionKind, ActionPayload, OfflineAction};
pub use domain::value_objects::{ActionId, UserId};
pub use infrastructure::connectivity::SharedConnectivityFlag;
pub use infrastructure::events::{
    Channel, ErrorBus, OperationKind, PermissionErrorEvent, Subscription,
};
pub use infrastructure::storage::{MemoryKeyValueStore, SqliteKeyValueStore};
pub use shared::classify::{is_offline_failure, is_permission_failure, ConnectivityStatus};
pub use shared::config::{AppConfig, PermissionHandling, ReplayPolicy};
pub use shared::error::{AppError, BackendCode, Result};
pub use shared::retry::{with_retry, RetryPolicy};
pub use shared::timeout::with_timeout;
pub use state::AppState;

/// ログ設定の初期化
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kaigo=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
