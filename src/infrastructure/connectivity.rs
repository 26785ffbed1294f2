use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::ConnectivityProbe;
use crate::shared::classify::ConnectivityStatus;

/// プラットフォーム側から更新できる共有接続フラグ。
///
/// Platform glue (or a test) flips the flag; the resilience layer only
/// reads it at classification time.
pub struct SharedConnectivityFlag {
    status: RwLock<ConnectivityStatus>,
}

impl SharedConnectivityFlag {
    pub fn new(status: ConnectivityStatus) -> Self {
        Self {
            status: RwLock::new(status),
        }
    }

    /// 接続APIが存在しない環境向けの既定値。
    pub fn unknown() -> Self {
        Self::new(ConnectivityStatus::Unknown)
    }

    pub async fn set(&self, status: ConnectivityStatus) {
        let mut current = self.status.write().await;
        *current = status;
    }
}

#[async_trait]
impl ConnectivityProbe for SharedConnectivityFlag {
    async fn status(&self) -> ConnectivityStatus {
        *self.status.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flag_transitions() {
        let flag = SharedConnectivityFlag::unknown();
        assert_eq!(flag.status().await, ConnectivityStatus::Unknown);

        flag.set(ConnectivityStatus::Offline).await;
        assert_eq!(flag.status().await, ConnectivityStatus::Offline);

        flag.set(ConnectivityStatus::Online).await;
        assert_eq!(flag.status().await, ConnectivityStatus::Online);
    }
}
