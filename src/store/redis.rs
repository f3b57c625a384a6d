use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tracing::{debug, warn};

use super::{KeyTtl, RegistryStore, Subscription};
use crate::config::StoreOptions;
use crate::error::Result;

/// Redis 后端存储
///
/// 普通命令复用一个 `ConnectionManager`，每个订阅独占一条 pubsub 连接
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(options: &StoreOptions) -> Result<Self> {
        let client = redis::Client::open(options.connection_info()?)?;
        let mut config = ConnectionManagerConfig::new();
        if let Some(timeout) = options.read_timeout {
            config = config.set_response_timeout(timeout);
        }
        let conn = ConnectionManager::new_with_config(client.clone(), config).await?;
        debug!("podchaos: connected to redis at {}", options.addr);
        Ok(Self { client, conn })
    }
}

#[async_trait]
impl RegistryStore for RedisStore {
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(key, field, value).await?;
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hdel::<_, _, ()>(key, field).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        let mut conn = self.conn.clone();
        let pairs: Vec<(String, String)> = conn.hgetall(key).await?;
        Ok(pairs)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        let millis = ttl.as_millis().max(1) as i64;
        let applied: bool = conn.pexpire(key, millis).await?;
        Ok(applied)
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut conn = self.conn.clone();
        let reply: i64 = conn.ttl(key).await?;
        Ok(KeyTtl::from_redis_reply(reply))
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let receivers: usize = conn.publish(channel, message).await?;
        Ok(receivers)
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(channel).await?;

        let channel = channel.to_string();
        let stream = pubsub.into_on_message().filter_map(move |msg| {
            let payload = match msg.get_payload::<String>() {
                Ok(payload) => Some(payload),
                Err(err) => {
                    warn!("podchaos: drop undecodable message on {}: {}", channel, err);
                    None
                }
            };
            futures::future::ready(payload)
        });
        Ok(stream.boxed())
    }
}
