//! 后台循环的失败通知
//!
//! 心跳、过期检测和订阅循环中的错误不会返回给 `register`/`deregister` 的调用方，
//! 统一记录日志并广播给通过 [`Registry::failures`](super::Registry::failures) 订阅的观察者。

use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::broadcast;
use tracing::warn;

use crate::error::RegistryError;

const FAILURE_CHANNEL_CAPACITY: usize = 64;

/// 后台循环类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    Subscribe,
    MonitorTtl,
    KeepAlive,
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopKind::Subscribe => write!(f, "subscribe"),
            LoopKind::MonitorTtl => write!(f, "monitor-ttl"),
            LoopKind::KeepAlive => write!(f, "keep-alive"),
        }
    }
}

/// 一次后台循环失败
#[derive(Debug, Clone)]
pub struct BackgroundFailure {
    pub kind: LoopKind,
    pub service_name: String,
    pub error: RegistryError,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub(crate) struct FailureSink {
    tx: broadcast::Sender<BackgroundFailure>,
}

impl FailureSink {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<BackgroundFailure> {
        self.tx.subscribe()
    }

    /// 记录并广播，没有观察者时只记录日志
    pub(crate) fn report(&self, kind: LoopKind, service_name: &str, error: RegistryError) {
        warn!(
            "podchaos: {} loop for {} failed: {}",
            kind, service_name, error
        );
        let _ = self.tx.send(BackgroundFailure {
            kind,
            service_name: service_name.to_string(),
            error,
            at: Utc::now(),
        });
    }
}
