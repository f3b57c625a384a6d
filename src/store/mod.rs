//! 后端存储抽象
//!
//! 注册中心只依赖 hash 读写、key 过期和发布订阅，
//! Redis 与进程内实现都通过 [`RegistryStore`] 接入。

pub mod memory;
pub mod redis;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::time::Duration;

use crate::error::Result;

pub use memory::MemoryStore;
pub use self::redis::RedisStore;

/// 已建立的订阅，逐条产出通知消息体
///
/// 流结束表示订阅连接已断开
pub type Subscription = BoxStream<'static, String>;

/// key 的过期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// key 不存在（或已过期）
    Missing,
    /// key 存在但没有过期时间
    Persistent,
    /// key 存在且剩余存活时间
    Expiring(Duration),
}

impl KeyTtl {
    /// 按 Redis `TTL` 命令的返回值解释：-2 不存在，-1 无过期时间
    pub fn from_redis_reply(reply: i64) -> Self {
        match reply {
            -2 => KeyTtl::Missing,
            -1 => KeyTtl::Persistent,
            secs => KeyTtl::Expiring(Duration::from_secs(secs.max(0) as u64)),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, KeyTtl::Missing)
    }
}

/// 注册中心后端存储
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// 写入 hash field
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()>;

    /// 删除 hash field
    async fn hdel(&self, key: &str, field: &str) -> Result<()>;

    /// 读取 hash 的全部 field/value
    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>>;

    /// 设置 key 的过期时间，key 不存在时返回 false
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// 查询 key 的过期状态
    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    /// 发布消息，返回收到消息的订阅者数量
    async fn publish(&self, channel: &str, message: &str) -> Result<usize>;

    /// 订阅频道，返回时订阅已经生效
    async fn subscribe(&self, channel: &str) -> Result<Subscription>;
}
