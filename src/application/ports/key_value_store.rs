use async_trait::async_trait;

use crate::shared::error::Result;

/// 端末ローカルの永続 key-value 名前空間。
///
/// The queue serializes its entire state as one value under one key, so
/// implementations only need whole-value get/set/remove.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}
