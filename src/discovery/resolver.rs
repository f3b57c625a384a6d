//! 服务解析
//!
//! 每次解析都直接读取存储，不经过也不更新成员缓存。

use std::sync::Arc;

use tracing::{debug, info};

use super::instance::{DEFAULT_WEIGHT, Instance, ResolveResult, TargetInfo};
use crate::codec::{RegistryInfo, service_key};
use crate::config::StoreOptions;
use crate::error::Result;
use crate::store::{RedisStore, RegistryStore};

pub const REDIS: &str = "redis";
const TCP: &str = "tcp";

/// 基于存储的服务解析器，无内部状态
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn RegistryStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// 连接 Redis 并创建解析器
    pub async fn connect(options: &StoreOptions) -> Result<Self> {
        let store = RedisStore::connect(options).await?;
        Ok(Self::new(Arc::new(store)))
    }

    pub fn name(&self) -> &'static str {
        REDIS
    }

    pub fn target<'a>(&self, target: &'a TargetInfo) -> &'a str {
        &target.host
    }

    /// 解析服务名下的全部实例
    ///
    /// 无法解析的记录会被跳过，不影响其他记录
    pub async fn resolve(&self, desc: &str) -> Result<ResolveResult> {
        let fvs = self.store.hgetall(&service_key(desc)).await?;

        let mut instances = Vec::with_capacity(fvs.len());
        for (field, value) in fvs {
            let record: RegistryInfo = match serde_json::from_str(&value) {
                Ok(record) => record,
                Err(err) => {
                    info!(
                        "podchaos: fail to unmarshal with err: {}, ignore instance Addr: {}",
                        err, field
                    );
                    continue;
                }
            };
            let weight = if record.weight <= 0 {
                DEFAULT_WEIGHT
            } else {
                record.weight
            };
            instances.push(Instance::new(TCP, record.addr, weight, record.tags));
        }

        debug!("podchaos: resolved {} instances for {}", instances.len(), desc);
        Ok(ResolveResult {
            cache_key: desc.to_string(),
            instances,
        })
    }
}
