//! 测试用存储，在进程内存储之上注入延迟和持续不断的订阅消息

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use super::{KeyTtl, MemoryStore, RegistryStore, Subscription};
use crate::error::Result;

#[derive(Default)]
pub(crate) struct FaultyStore {
    pub(crate) inner: MemoryStore,
    /// 每次 HSET 前等待的时间
    pub(crate) hset_delay: Option<Duration>,
    /// 订阅后不断重复产出的消息
    pub(crate) flood: Option<String>,
}

#[async_trait]
impl RegistryStore for FaultyStore {
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        if let Some(delay) = self.hset_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.hset(key, field, value).await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<()> {
        self.inner.hdel(key, field).await
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        self.inner.hgetall(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        self.inner.ttl(key).await
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize> {
        self.inner.publish(channel, message).await
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        match &self.flood {
            Some(message) => Ok(futures::stream::repeat(message.clone()).boxed()),
            None => self.inner.subscribe(channel).await,
        }
    }
}
