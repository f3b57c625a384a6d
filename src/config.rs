use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RegistryError, Result};

pub const DEFAULT_EXPIRE_TIME: Duration = Duration::from_secs(60);
pub const DEFAULT_TICKER_TIME: Duration = Duration::from_secs(30);
pub const DEFAULT_KEEP_ALIVE_TIME: Duration = Duration::from_secs(60);
pub const DEFAULT_MONITOR_TIME: Duration = Duration::from_secs(30);

/// 建立存储连接的方式
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialer {
    /// 通过 `addr` 建立 TCP 连接
    #[default]
    Tcp,
    /// 通过 Unix socket 连接，忽略 `addr`
    Unix(PathBuf),
}

/// TLS 传输配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    /// 跳过证书校验
    pub insecure: bool,
}

/// 存储连接选项
///
/// 每个 `with_*` 只修改对应的一项，未设置的项保持 Redis 默认值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub addr: String,
    pub password: Option<String>,
    pub db: i64,
    pub tls: Option<TlsConfig>,
    pub dialer: Dialer,
    pub read_timeout: Option<Duration>,
}

impl StoreOptions {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            password: None,
            db: 0,
            tls: None,
            dialer: Dialer::Tcp,
            read_timeout: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_dialer(mut self, dialer: Dialer) -> Self {
        self.dialer = dialer;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// 拼接连接 URL（不含认证信息）
    fn base_url(&self) -> String {
        match &self.dialer {
            Dialer::Unix(path) => format!("redis+unix://{}", path.display()),
            Dialer::Tcp if self.addr.contains("://") => self.addr.clone(),
            Dialer::Tcp => match &self.tls {
                Some(tls) if tls.insecure => format!("rediss://{}/#insecure", self.addr),
                Some(_) => format!("rediss://{}", self.addr),
                None => format!("redis://{}", self.addr),
            },
        }
    }

    /// 生成 redis 连接信息，密码和库号直接写入连接信息，不经过 URL 编码
    pub fn connection_info(&self) -> Result<redis::ConnectionInfo> {
        use redis::IntoConnectionInfo;

        let url = self.base_url();
        let mut info = url
            .as_str()
            .into_connection_info()
            .map_err(|err| {
                RegistryError::configuration(format!("invalid store address {}: {}", url, err))
            })?;
        info.redis.db = self.db;
        if self.password.is_some() {
            info.redis.password = self.password.clone();
        }
        Ok(info)
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new("127.0.0.1:6379")
    }
}

/// 注册生命周期中的各个时间参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryTiming {
    /// 注册时设置的 key 过期时间
    pub expire: Duration,
    /// 心跳间隔
    pub keep_alive_interval: Duration,
    /// 心跳时恢复的过期时间
    pub keep_alive_ttl: Duration,
    /// 过期检测间隔
    pub monitor_interval: Duration,
}

impl Default for RegistryTiming {
    fn default() -> Self {
        Self {
            expire: DEFAULT_EXPIRE_TIME,
            keep_alive_interval: DEFAULT_TICKER_TIME,
            keep_alive_ttl: DEFAULT_KEEP_ALIVE_TIME,
            monitor_interval: DEFAULT_MONITOR_TIME,
        }
    }
}

/// 配置文件格式
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_addr")]
    pub addr: String,
    pub password: Option<String>,
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub tls: bool,
    #[serde(default)]
    pub tls_insecure: bool,
    pub unix_socket: Option<PathBuf>,
    pub read_timeout_ms: Option<u64>,
}

fn default_store_addr() -> String {
    "127.0.0.1:6379".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            addr: default_store_addr(),
            password: None,
            db: 0,
            tls: false,
            tls_insecure: false,
            unix_socket: None,
            read_timeout_ms: None,
        }
    }
}

/// 时间参数（秒）
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    pub expire_secs: u64,
    pub keep_alive_interval_secs: u64,
    pub keep_alive_ttl_secs: u64,
    pub monitor_interval_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            expire_secs: DEFAULT_EXPIRE_TIME.as_secs(),
            keep_alive_interval_secs: DEFAULT_TICKER_TIME.as_secs(),
            keep_alive_ttl_secs: DEFAULT_KEEP_ALIVE_TIME.as_secs(),
            monitor_interval_secs: DEFAULT_MONITOR_TIME.as_secs(),
        }
    }
}

impl RegistryConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RegistryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let t = &self.timing;
        if t.expire_secs == 0
            || t.keep_alive_interval_secs == 0
            || t.keep_alive_ttl_secs == 0
            || t.monitor_interval_secs == 0
        {
            return Err(RegistryError::configuration("timing values must be positive"));
        }
        if t.keep_alive_interval_secs >= t.keep_alive_ttl_secs {
            return Err(RegistryError::configuration(
                "keep_alive_interval_secs must be shorter than keep_alive_ttl_secs",
            ));
        }
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        let store = &self.store;
        let mut options = StoreOptions::new(store.addr.clone()).with_db(store.db);
        if let Some(password) = &store.password {
            options = options.with_password(password.clone());
        }
        if store.tls {
            options = options.with_tls(TlsConfig {
                insecure: store.tls_insecure,
            });
        }
        if let Some(path) = &store.unix_socket {
            options = options.with_dialer(Dialer::Unix(path.clone()));
        }
        if let Some(ms) = store.read_timeout_ms {
            options = options.with_read_timeout(Duration::from_millis(ms));
        }
        options
    }

    pub fn timing(&self) -> RegistryTiming {
        RegistryTiming {
            expire: Duration::from_secs(self.timing.expire_secs),
            keep_alive_interval: Duration::from_secs(self.timing.keep_alive_interval_secs),
            keep_alive_ttl: Duration::from_secs(self.timing.keep_alive_ttl_secs),
            monitor_interval: Duration::from_secs(self.timing.monitor_interval_secs),
        }
    }
}
