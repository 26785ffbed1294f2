use serde::{Deserialize, Serialize};

use crate::shared::retry::RetryPolicy;

/// キュー再生時の失敗ポリシー。
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// 失敗した時点で再生を止め、順序を保つ（既定）。
    #[default]
    StopOnFirstFailure,
    /// 失敗したアクションを残したまま後続を再生する。
    ContinueOnFailure,
}

/// 権限エラーの扱い。
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionHandling {
    /// ログに残して握りつぶす（既定、UIを落とさない）。
    #[default]
    Lenient,
    /// バスに流した上で呼び出し元へ再送出する。
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub retry: RetryConfig,
    pub sync: SyncConfig,
    pub errors: ErrorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub queue_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval: u64,
    #[serde(default)]
    pub replay_policy: ReplayPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorConfig {
    #[serde(default)]
    pub permission_handling: PermissionHandling,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                database_url: "sqlite:data/kaigo.db".to_string(),
                max_connections: 5,
                queue_key: "kaigo.offline_queue".to_string(),
            },
            retry: RetryConfig {
                max_attempts: 3,
                delay_ms: 1000,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval: 300, // 5 minutes
                replay_policy: ReplayPolicy::default(),
            },
            errors: ErrorConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("KAIGO_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.storage.database_url = v;
            }
        }
        if let Ok(v) = std::env::var("KAIGO_QUEUE_KEY") {
            if !v.trim().is_empty() {
                cfg.storage.queue_key = v;
            }
        }
        if let Ok(v) = std::env::var("KAIGO_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.storage.max_connections = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("KAIGO_RETRY_MAX_ATTEMPTS") {
            if let Some(value) = parse_u32(&v) {
                cfg.retry.max_attempts = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("KAIGO_RETRY_DELAY_MS") {
            if let Some(value) = parse_u64(&v) {
                cfg.retry.delay_ms = value;
            }
        }
        if let Ok(v) = std::env::var("KAIGO_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("KAIGO_SYNC_INTERVAL") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("KAIGO_REPLAY_CONTINUE_ON_FAILURE") {
            cfg.sync.replay_policy = if parse_bool(&v, false) {
                ReplayPolicy::ContinueOnFailure
            } else {
                ReplayPolicy::StopOnFirstFailure
            };
        }
        if let Ok(v) = std::env::var("KAIGO_PERMISSION_STRICT") {
            cfg.errors.permission_handling = if parse_bool(&v, false) {
                PermissionHandling::Strict
            } else {
                PermissionHandling::Lenient
            };
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.storage.max_connections == 0 {
            return Err("Storage max_connections must be greater than 0".to_string());
        }
        if self.storage.queue_key.trim().is_empty() {
            return Err("Storage queue_key cannot be empty".to_string());
        }
        if self.retry.max_attempts == 0 {
            return Err("Retry max_attempts must be greater than 0".to_string());
        }
        if self.sync.auto_sync && self.sync.sync_interval == 0 {
            return Err("Sync sync_interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
