use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{Mutex, broadcast};
use tokio::time::Instant;

use super::{KeyTtl, RegistryStore, Subscription};
use crate::error::Result;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct HashEntry {
    fields: BTreeMap<String, String>,
    expires_at: Option<Instant>,
}

impl HashEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Default)]
struct Inner {
    hashes: HashMap<String, HashEntry>,
    channels: HashMap<String, broadcast::Sender<String>>,
}

impl Inner {
    /// 取出未过期的 key，过期的 key 在访问时惰性删除
    fn live(&mut self, key: &str) -> Option<&mut HashEntry> {
        let now = Instant::now();
        if self.hashes.get(key).is_some_and(|entry| entry.is_expired(now)) {
            self.hashes.remove(key);
        }
        self.hashes.get_mut(key)
    }
}

/// 进程内存储
///
/// 语义与 Redis 保持一致：hash 为空时 key 消失，HSET 不改变已有的过期时间，
/// 发布只投递给当前在线的订阅者。时间来自 `tokio::time`，可在测试中暂停推进。
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.live(key);
        inner
            .hashes
            .entry(key.to_string())
            .or_default()
            .fields
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        let now_empty = match inner.live(key) {
            Some(entry) => {
                entry.fields.remove(field);
                entry.fields.is_empty()
            }
            None => false,
        };
        if now_empty {
            inner.hashes.remove(key);
        }
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<Vec<(String, String)>> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .live(key)
            .map(|entry| {
                entry
                    .fields
                    .iter()
                    .map(|(field, value)| (field.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        match inner.live(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.live(key) {
            None => KeyTtl::Missing,
            Some(HashEntry {
                expires_at: None, ..
            }) => KeyTtl::Persistent,
            Some(HashEntry {
                expires_at: Some(at),
                ..
            }) => KeyTtl::Expiring(at.saturating_duration_since(Instant::now())),
        })
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<usize> {
        let mut inner = self.inner.lock().await;
        let Some(tx) = inner.channels.get(channel) else {
            return Ok(0);
        };
        // 没有订阅者的频道直接清理
        if tx.receiver_count() == 0 {
            inner.channels.remove(channel);
            return Ok(0);
        }
        Ok(tx.send(message.to_string()).unwrap_or(0))
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        let mut inner = self.inner.lock().await;
        let rx = inner
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(message) => return Some((message, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("podchaos: subscriber lagged, {} messages dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(stream.boxed())
    }
}
