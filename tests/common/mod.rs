#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use podchaos_registry::{Info, MemoryStore, Mentor, NetAddr, Registry, RegistryStore};

pub fn test_info(service_name: &str, addr: &str) -> Info {
    Info::new(service_name, NetAddr::tcp(addr))
        .with_tag("env", "test")
        .with_tag("region", "us-east-1")
}

/// 同一存储上的一个“进程”：独立的成员缓存和注册器
pub fn new_process(store: &Arc<MemoryStore>) -> (Arc<Mentor>, Registry) {
    let mentor = Arc::new(Mentor::new());
    let store: Arc<dyn RegistryStore> = store.clone();
    let registry = Registry::new(store, mentor.clone());
    (mentor, registry)
}

/// 等待成员缓存满足条件，返回最后一次看到的地址列表
pub async fn wait_for_addrs<F>(mentor: &Mentor, service_name: &str, pred: F) -> Vec<String>
where
    F: Fn(&[String]) -> bool,
{
    let mut addrs = mentor.addrs(service_name).await;
    for _ in 0..200 {
        if pred(&addrs) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        addrs = mentor.addrs(service_name).await;
    }
    addrs
}
