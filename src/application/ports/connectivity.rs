use async_trait::async_trait;

use crate::shared::classify::ConnectivityStatus;

/// プラットフォームの接続状態シグナル。
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn status(&self) -> ConnectivityStatus;
}
