use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

use crate::error::{RegistryError, Result};

/// 网络地址
///
/// `address` 是地址的字符串形式（如 `10.0.0.1:9000`），同时也是存储中的 field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetAddr {
    pub network: String,
    pub address: String,
}

impl NetAddr {
    pub fn new(network: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            address: address.into(),
        }
    }

    /// 创建 tcp 地址
    pub fn tcp(address: impl Into<String>) -> Self {
        Self::new("tcp", address)
    }

    pub fn network(&self) -> &str {
        &self.network
    }
}

impl fmt::Display for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl From<SocketAddr> for NetAddr {
    fn from(addr: SocketAddr) -> Self {
        Self::tcp(addr.to_string())
    }
}

/// 服务注册请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    /// 服务名，不能为空
    pub service_name: String,
    /// 服务地址，必填
    pub addr: Option<NetAddr>,
    /// 权重，<= 0 时在解析阶段使用默认权重
    pub weight: i64,
    /// 扩展标签
    pub tags: HashMap<String, String>,
}

impl Info {
    pub fn new(service_name: impl Into<String>, addr: impl Into<NetAddr>) -> Self {
        Self {
            service_name: service_name.into(),
            addr: Some(addr.into()),
            weight: 0,
            tags: HashMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// 校验注册信息，返回地址
    pub fn validate(&self) -> Result<&NetAddr> {
        if self.service_name.is_empty() {
            return Err(RegistryError::invalid_request(
                "registry.Info ServiceName can not be empty",
            ));
        }
        match &self.addr {
            Some(addr) if !addr.address.is_empty() => Ok(addr),
            _ => Err(RegistryError::invalid_request(
                "registry.Info Addr can not be empty",
            )),
        }
    }
}
