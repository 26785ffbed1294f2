use serde::{Deserialize, Serialize};
use thiserror::Error;

/// バックエンドが返す機械可読なエラーコード。
///
/// Codes outside the recognized set are preserved as `Other` and treated
/// as generic failures by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendCode {
    Unavailable,
    DeadlineExceeded,
    PermissionDenied,
    #[serde(untagged)]
    Other(String),
}

impl BackendCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "unavailable" => BackendCode::Unavailable,
            "deadline-exceeded" => BackendCode::DeadlineExceeded,
            "permission-denied" => BackendCode::PermissionDenied,
            other => BackendCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BackendCode::Unavailable => "unavailable",
            BackendCode::DeadlineExceeded => "deadline-exceeded",
            BackendCode::PermissionDenied => "permission-denied",
            BackendCode::Other(code) => code,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {message}")]
    Backend {
        code: Option<BackendCode>,
        message: String,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// バックエンド失敗をコード文字列付きで生成する。
    pub fn backend(code: &str, message: impl Into<String>) -> Self {
        AppError::Backend {
            code: Some(BackendCode::parse(code)),
            message: message.into(),
        }
    }

    pub fn backend_uncoded(message: impl Into<String>) -> Self {
        AppError::Backend {
            code: None,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        AppError::Backend {
            code: Some(BackendCode::Unavailable),
            message: message.into(),
        }
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        AppError::Backend {
            code: Some(BackendCode::DeadlineExceeded),
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        AppError::Backend {
            code: Some(BackendCode::PermissionDenied),
            message: message.into(),
        }
    }

    pub fn backend_code(&self) -> Option<&BackendCode> {
        match self {
            AppError::Backend { code, .. } => code.as_ref(),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
