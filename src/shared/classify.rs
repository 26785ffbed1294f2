use serde::{Deserialize, Serialize};

use crate::shared::error::{AppError, BackendCode};

/// 接続状態。プラットフォームAPIが無い環境では `Unknown` を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityStatus {
    Online,
    Offline,
    Unknown,
}

/// Offline classification: the connectivity signal alone is sufficient,
/// otherwise the failure must carry one of the transient backend codes.
/// `Unknown` connectivity defaults to not-offline.
pub fn is_offline_failure(error: Option<&AppError>, connectivity: ConnectivityStatus) -> bool {
    if connectivity == ConnectivityStatus::Offline {
        return true;
    }

    matches!(
        error.and_then(AppError::backend_code),
        Some(BackendCode::Unavailable) | Some(BackendCode::DeadlineExceeded)
    )
}

/// Permission classification: true only for the `permission-denied` code.
pub fn is_permission_failure(error: &AppError) -> bool {
    error.backend_code() == Some(&BackendCode::PermissionDenied)
}
