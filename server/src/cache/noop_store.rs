use std::time::Duration;

use async_trait::async_trait;

use super::CacheStore;

#[derive(Clone, Debug, Default)]
pub struct NoopCacheStore;

#[async_trait]
impl CacheStore for NoopCacheStore {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> anyhow::Result<()> {
        Ok(())
    }

    async fn del(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
