use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;

use crate::application::ports::{ConnectivityProbe, KeyValueStore};
use crate::application::services::{ActionQueue, GuardedWriteService, SyncService};
use crate::infrastructure::events::ErrorBus;
use crate::infrastructure::storage::SqliteKeyValueStore;
use crate::shared::config::AppConfig;
use crate::shared::error::{AppError, Result};

/// アプリ全体の合成ルート。起動時に一度構築して配る。
pub struct AppState {
    pub config: AppConfig,
    pub queue: Arc<ActionQueue>,
    pub error_bus: Arc<ErrorBus>,
    pub writes: Arc<GuardedWriteService>,
    pub sync: Arc<SyncService>,
}

impl AppState {
    /// SQLite ストアを開いて全サービスを配線する。
    pub async fn new(config: AppConfig, probe: Arc<dyn ConnectivityProbe>) -> Result<Self> {
        config.validate().map_err(AppError::Validation)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(config.storage.max_connections)
            .connect(&config.storage.database_url)
            .await?;
        SqliteKeyValueStore::initialize(&pool).await?;
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(pool));

        Self::with_store(config, store, probe)
    }

    /// 任意のストア実装で配線する（テスト、非SQLite環境向け）。
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Result<Self> {
        config.validate().map_err(AppError::Validation)?;

        let queue = Arc::new(ActionQueue::with_key(
            store,
            config.storage.queue_key.clone(),
        ));
        let error_bus = Arc::new(ErrorBus::new());
        let writes = Arc::new(GuardedWriteService::new(
            queue.clone(),
            probe.clone(),
            error_bus.clone(),
            config.retry.policy(),
            config.errors.permission_handling,
        ));
        let sync = Arc::new(SyncService::new(
            queue.clone(),
            probe,
            config.sync.replay_policy,
        ));

        if config.sync.auto_sync {
            sync.schedule_sync(config.sync.sync_interval);
        }

        Ok(Self {
            config,
            queue,
            error_bus,
            writes,
            sync,
        })
    }
}
