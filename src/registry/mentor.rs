//! 成员缓存
//!
//! 订阅服务的变更通知，在本地维护 `服务名 -> 地址列表`。
//! 同一个 [`Mentor`] 由调用方显式创建，并注入到需要它的每个 [`Registry`](super::Registry)。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::events::{FailureSink, LoopKind};
use crate::codec::{Notification, service_key};
use crate::error::{RegistryError, Result};
use crate::store::{KeyTtl, RegistryStore};

/// 成员缓存
///
/// 地址按收到通知的顺序保存，不去重
#[derive(Default)]
pub struct Mentor {
    form: Mutex<HashMap<String, Vec<String>>>,
}

impl Mentor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 服务当前已知的地址
    pub async fn addrs(&self, service_name: &str) -> Vec<String> {
        let form = self.form.lock().await;
        form.get(service_name).cloned().unwrap_or_default()
    }

    /// 缓存中的服务名
    pub async fn services(&self) -> Vec<String> {
        let form = self.form.lock().await;
        let mut names: Vec<String> = form.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn snapshot(&self) -> HashMap<String, Vec<String>> {
        self.form.lock().await.clone()
    }

    /// 应用一条通知消息，无法识别的消息记录日志后丢弃
    pub async fn apply(&self, payload: &str) -> Option<Notification> {
        let Some(notification) = Notification::parse(payload) else {
            info!("podchaos: invalid message {}", payload);
            return None;
        };

        let mut form = self.form.lock().await;
        match &notification {
            Notification::Register { service_name, addr } => {
                form.entry(service_name.clone()).or_default().push(addr.clone());
            }
            Notification::Deregister { service_name, addr } => {
                if let Some(addrs) = form.get_mut(service_name) {
                    if let Some(pos) = addrs.iter().position(|a| a == addr) {
                        addrs.remove(pos);
                    }
                }
            }
        }
        info!("podchaos: service info {:?}", *form);
        Some(notification)
    }

    /// 删除整个服务条目
    pub async fn remove_service(&self, service_name: &str) -> bool {
        let mut form = self.form.lock().await;
        let removed = form.remove(service_name).is_some();
        if removed {
            info!("podchaos: service {} expired, evicted from cache", service_name);
        }
        removed
    }

    /// 启动订阅循环，订阅生效后才返回
    pub(crate) async fn spawn_subscriber(
        self: &Arc<Self>,
        store: Arc<dyn RegistryStore>,
        service_name: &str,
        token: CancellationToken,
        failures: FailureSink,
    ) -> Result<JoinHandle<()>> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let mentor = Arc::clone(self);
        let service_name = service_name.to_string();
        let handle = tokio::spawn(async move {
            mentor
                .subscribe(store, service_name, token, ready_tx, failures)
                .await
        });

        match ready_rx.await {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(RegistryError::store("subscribe loop exited before it was ready")),
        }
    }

    async fn subscribe(
        self: Arc<Self>,
        store: Arc<dyn RegistryStore>,
        service_name: String,
        token: CancellationToken,
        ready: oneshot::Sender<Result<()>>,
        failures: FailureSink,
    ) {
        let channel = service_key(&service_name);
        let mut sub = match store.subscribe(&channel).await {
            Ok(sub) => sub,
            Err(err) => {
                let _ = ready.send(Err(err));
                return;
            }
        };
        let _ = ready.send(Ok(()));
        debug!("podchaos: subscribed to {}", channel);

        // 已送达的消息优先于取消信号处理，每处理一条后再检查一次取消
        loop {
            tokio::select! {
                biased;
                msg = sub.next() => match msg {
                    Some(payload) => {
                        self.apply(&payload).await;
                        if token.is_cancelled() {
                            break;
                        }
                    }
                    None => {
                        if !token.is_cancelled() {
                            failures.report(
                                LoopKind::Subscribe,
                                &service_name,
                                RegistryError::store(format!("subscription to {} closed", channel)),
                            );
                        }
                        break;
                    }
                },
                _ = token.cancelled() => break,
            }
        }
        debug!("podchaos: unsubscribed from {}", channel);
    }

    /// 周期检查服务 key 是否还存在，key 过期即视为服务的全部实例下线
    pub(crate) async fn monitor_ttl(
        self: Arc<Self>,
        store: Arc<dyn RegistryStore>,
        service_name: String,
        period: Duration,
        token: CancellationToken,
        failures: FailureSink,
    ) {
        let key = service_key(&service_name);
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => match store.ttl(&key).await {
                    Ok(KeyTtl::Missing) => {
                        self.remove_service(&service_name).await;
                    }
                    Ok(_) => {}
                    Err(err) => failures.report(LoopKind::MonitorTtl, &service_name, err),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::store::testing::FaultyStore;

    #[tokio::test]
    async fn test_register_then_deregister_notification() {
        let mentor = Mentor::new();
        mentor.apply("register-svcA-10.0.0.1:9000").await;
        assert_eq!(mentor.addrs("svcA").await, vec!["10.0.0.1:9000"]);

        mentor.apply("deregister-svcA-10.0.0.1:9000").await;
        assert!(mentor.addrs("svcA").await.is_empty());
    }

    #[tokio::test]
    async fn test_deregister_removes_one_occurrence() {
        let mentor = Mentor::new();
        mentor.apply("register-svcA-10.0.0.1:9000").await;
        mentor.apply("register-svcA-10.0.0.2:9000").await;
        mentor.apply("register-svcA-10.0.0.1:9000").await;

        let applied = mentor.apply("deregister-svcA-10.0.0.1:9000").await;
        assert_eq!(applied, Some(Notification::deregister("svcA", "10.0.0.1:9000")));
        assert_eq!(
            mentor.addrs("svcA").await,
            vec!["10.0.0.2:9000", "10.0.0.1:9000"]
        );
    }

    #[tokio::test]
    async fn test_invalid_messages_are_dropped() {
        let mentor = Mentor::new();
        assert_eq!(mentor.apply("garbage").await, None);
        assert_eq!(mentor.apply("update-svcA-10.0.0.1:9000").await, None);
        assert!(mentor.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_stops_on_cancel() {
        let mentor = Arc::new(Mentor::new());
        let store: Arc<dyn RegistryStore> = Arc::new(MemoryStore::new());
        let token = CancellationToken::new();

        let handle = mentor
            .spawn_subscriber(store.clone(), "svcA", token.clone(), FailureSink::new())
            .await
            .unwrap();
        assert_eq!(store.publish("/podchaos/svcA/server", "register-svcA-a:1").await.unwrap(), 1);

        token.cancel();
        handle.await.unwrap();
        assert_eq!(mentor.addrs("svcA").await, vec!["a:1"]);
        assert_eq!(store.publish("/podchaos/svcA/server", "register-svcA-b:1").await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_subscriber_stops_on_cancel_under_constant_traffic() {
        let mentor = Arc::new(Mentor::new());
        let store: Arc<dyn RegistryStore> = Arc::new(FaultyStore {
            flood: Some("register-svcA-a:1".to_string()),
            ..Default::default()
        });
        let token = CancellationToken::new();

        let handle = mentor
            .spawn_subscriber(store, "svcA", token.clone(), FailureSink::new())
            .await
            .unwrap();
        token.cancel();

        let joined = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(joined.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_evicts_whole_service_on_expiry() {
        let mentor = Arc::new(Mentor::new());
        let store: Arc<dyn RegistryStore> = Arc::new(MemoryStore::new());
        let key = service_key("svcA");
        store.hset(&key, "a:1", "{}").await.unwrap();
        store.expire(&key, Duration::from_secs(45)).await.unwrap();
        mentor.apply("register-svcA-a:1").await;
        mentor.apply("register-svcA-b:1").await;
        mentor.apply("register-svcB-c:1").await;

        let token = CancellationToken::new();
        let handle = tokio::spawn(mentor.clone().monitor_ttl(
            store,
            "svcA".to_string(),
            Duration::from_secs(30),
            token.clone(),
            FailureSink::new(),
        ));

        // 第一次检查时 key 仍然存在
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(mentor.addrs("svcA").await.len(), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(mentor.addrs("svcA").await.is_empty());
        assert_eq!(mentor.services().await, vec!["svcB"]);

        token.cancel();
        handle.await.unwrap();
    }
}
