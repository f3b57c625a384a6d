use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::events::{FailureSink, LoopKind};
use crate::error::RegistryError;
use crate::store::RegistryStore;

/// 心跳循环：每个周期把服务 key 的过期时间恢复为 `ttl`
///
/// 进程崩溃后心跳停止，key 自然过期，不需要额外的故障检测
pub(crate) async fn keep_alive(
    store: Arc<dyn RegistryStore>,
    service_name: String,
    key: String,
    period: Duration,
    ttl: Duration,
    token: CancellationToken,
    failures: FailureSink,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => match store.expire(&key, ttl).await {
                Ok(true) => debug!("podchaos: refreshed ttl of {}", key),
                Ok(false) => failures.report(
                    LoopKind::KeepAlive,
                    &service_name,
                    RegistryError::store(format!("key {} no longer exists", key)),
                ),
                Err(err) => failures.report(LoopKind::KeepAlive, &service_name, err),
            },
        }
    }
}
