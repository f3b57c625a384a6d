//! 单个本地实例的注册生命周期

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::events::{BackgroundFailure, FailureSink};
use super::keep_alive::keep_alive;
use super::mentor::Mentor;
use crate::codec::{Notification, RegistryHash, prepare_registry_hash};
use crate::config::{RegistryConfig, RegistryTiming, StoreOptions};
use crate::error::{RegistryError, Result};
use crate::store::{RedisStore, RegistryStore};
use crate::types::Info;

/// 一次成功注册对应的生命周期
///
/// 取消 `token` 是停止订阅、过期检测、心跳三个循环的唯一方式
struct RegistryContext {
    service_name: String,
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl RegistryContext {
    async fn shutdown(self) {
        self.token.cancel();
        for handle in self.handles {
            if let Err(err) = handle.await {
                error!(
                    "podchaos: background loop of {} terminated abnormally: {}",
                    self.service_name, err
                );
            }
        }
    }
}

/// 服务注册器
///
/// 同一时刻最多持有一个活跃注册
pub struct Registry {
    store: Arc<dyn RegistryStore>,
    mentor: Arc<Mentor>,
    timing: RegistryTiming,
    state: Mutex<Option<RegistryContext>>,
    failures: FailureSink,
}

impl Registry {
    pub fn new(store: Arc<dyn RegistryStore>, mentor: Arc<Mentor>) -> Self {
        Self {
            store,
            mentor,
            timing: RegistryTiming::default(),
            state: Mutex::new(None),
            failures: FailureSink::new(),
        }
    }

    /// 连接 Redis 并创建注册器
    pub async fn connect(options: &StoreOptions, mentor: Arc<Mentor>) -> Result<Self> {
        let store = RedisStore::connect(options).await?;
        Ok(Self::new(Arc::new(store), mentor))
    }

    /// 按配置文件创建注册器
    pub async fn from_config(config: &RegistryConfig, mentor: Arc<Mentor>) -> Result<Self> {
        Ok(Self::connect(&config.store_options(), mentor)
            .await?
            .with_timing(config.timing()))
    }

    pub fn with_timing(mut self, timing: RegistryTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn mentor(&self) -> &Arc<Mentor> {
        &self.mentor
    }

    pub fn timing(&self) -> RegistryTiming {
        self.timing
    }

    /// 订阅后台循环的失败通知
    pub fn failures(&self) -> broadcast::Receiver<BackgroundFailure> {
        self.failures.subscribe()
    }

    pub async fn is_registered(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// 注册服务
    ///
    /// 已有活跃注册时先停止它的后台循环再建立新的注册
    pub async fn register(&self, info: &Info) -> Result<()> {
        self.register_with(info, true).await
    }

    /// 注册服务，已有活跃注册时返回 `AlreadyRegistered`
    pub async fn register_exclusive(&self, info: &Info) -> Result<()> {
        self.register_with(info, false).await
    }

    async fn register_with(&self, info: &Info, replace: bool) -> Result<()> {
        let addr = info.validate()?;
        let hash = prepare_registry_hash(info)?;

        let mut state = self.state.lock().await;
        if let Some(active) = state.take() {
            if !replace {
                let service_name = active.service_name.clone();
                *state = Some(active);
                return Err(RegistryError::already_registered(service_name));
            }
            info!(
                "podchaos: replacing active registration of {}",
                active.service_name
            );
            active.shutdown().await;
        }

        // 订阅必须先于发布生效
        let token = CancellationToken::new();
        // 注册完成前调用方放弃等待时，已启动的循环随之取消
        let guard = token.clone().drop_guard();
        let subscriber = self
            .mentor
            .spawn_subscriber(
                self.store.clone(),
                &info.service_name,
                token.clone(),
                self.failures.clone(),
            )
            .await?;

        let notification = Notification::register(&info.service_name, addr.to_string());
        if let Err(err) = self.announce(&hash, &notification).await {
            drop(guard);
            let _ = subscriber.await;
            return Err(err);
        }

        let monitor = tokio::spawn(self.mentor.clone().monitor_ttl(
            self.store.clone(),
            info.service_name.clone(),
            self.timing.monitor_interval,
            token.clone(),
            self.failures.clone(),
        ));
        let keeper = tokio::spawn(keep_alive(
            self.store.clone(),
            info.service_name.clone(),
            hash.key.clone(),
            self.timing.keep_alive_interval,
            self.timing.keep_alive_ttl,
            token.clone(),
            self.failures.clone(),
        ));

        *state = Some(RegistryContext {
            service_name: info.service_name.clone(),
            token,
            handles: vec![subscriber, monitor, keeper],
        });
        guard.disarm();

        info!("Service registered: {} at {}", info.service_name, addr);
        Ok(())
    }

    /// 写入记录、设置过期时间、发布注册通知
    async fn announce(&self, hash: &RegistryHash, notification: &Notification) -> Result<()> {
        self.store.hset(&hash.key, &hash.field, &hash.value).await?;
        self.store.expire(&hash.key, self.timing.expire).await?;
        self.store.publish(&hash.key, &notification.encode()).await?;
        Ok(())
    }

    /// 注销服务并停止该注册的全部后台循环
    ///
    /// 服务名与活跃注册不一致时返回 `NotRegistered`，不修改存储
    pub async fn deregister(&self, info: &Info) -> Result<()> {
        let addr = info.validate()?;
        let hash = prepare_registry_hash(info)?;

        let mut state = self.state.lock().await;
        match state.as_ref() {
            Some(active) if active.service_name == info.service_name => {}
            _ => return Err(RegistryError::not_registered(info.service_name.clone())),
        }

        self.store.hdel(&hash.key, &hash.field).await?;
        let notification = Notification::deregister(&info.service_name, addr.to_string());
        self.store.publish(&hash.key, &notification.encode()).await?;

        if let Some(active) = state.take() {
            active.shutdown().await;
        }

        info!("Service deregistered: {} at {}", info.service_name, addr);
        Ok(())
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if let Some(active) = self.state.get_mut().take() {
            active.token.cancel();
        }
    }
}
