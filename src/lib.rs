//! podchaos 服务注册与发现
//!
//! 基于 Redis 的 hash、key 过期和发布订阅实现：
//! - [`Registry`] 写入本实例的注册记录并通过心跳保活
//! - [`Mentor`] 订阅变更通知，维护本地成员缓存
//! - [`Resolver`] 直接读取存储，返回带权重的实例列表
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use podchaos_registry::{Info, Mentor, NetAddr, Registry, Resolver, StoreOptions};
//!
//! # async fn run() -> podchaos_registry::Result<()> {
//! let options = StoreOptions::new("127.0.0.1:6379").with_db(1);
//! let mentor = Arc::new(Mentor::new());
//! let registry = Registry::connect(&options, mentor.clone()).await?;
//!
//! let info = Info::new("svcA", NetAddr::tcp("10.0.0.1:9000")).with_weight(20);
//! registry.register(&info).await?;
//!
//! let resolver = Resolver::connect(&options).await?;
//! let result = resolver.resolve("svcA").await?;
//! assert_eq!(result.instances.len(), 1);
//!
//! registry.deregister(&info).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod registry;
pub mod store;
pub mod types;

pub use config::{Dialer, RegistryConfig, RegistryTiming, StoreOptions, TlsConfig};
pub use discovery::{DEFAULT_WEIGHT, Instance, ResolveResult, Resolver, TargetInfo};
pub use error::{ErrorCategory, ErrorCode, RegistryError, Result};
pub use registry::{BackgroundFailure, LoopKind, Mentor, Registry};
pub use store::{KeyTtl, MemoryStore, RedisStore, RegistryStore, Subscription};
pub use types::{Info, NetAddr};
