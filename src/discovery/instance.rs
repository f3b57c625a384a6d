//! 服务实例定义

use std::collections::HashMap;

use crate::types::NetAddr;

/// 默认权重，注册权重 <= 0 时使用
pub const DEFAULT_WEIGHT: i64 = 10;

/// 解析得到的服务实例
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    addr: NetAddr,
    weight: i64,
    tags: HashMap<String, String>,
}

impl Instance {
    /// 创建新的服务实例
    pub fn new(
        network: impl Into<String>,
        address: impl Into<String>,
        weight: i64,
        tags: HashMap<String, String>,
    ) -> Self {
        Self {
            addr: NetAddr::new(network, address),
            weight,
            tags,
        }
    }

    pub fn address(&self) -> &NetAddr {
        &self.addr
    }

    /// 权重，<= 0 时回落到 [`DEFAULT_WEIGHT`]
    pub fn weight(&self) -> i64 {
        if self.weight > 0 {
            self.weight
        } else {
            DEFAULT_WEIGHT
        }
    }

    /// 查询标签，不存在时返回 `None`
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }
}

/// 解析目标描述
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetInfo {
    pub host: String,
    pub tags: HashMap<String, String>,
}

/// 一次解析的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveResult {
    /// 供调用方缓存使用的 key，等于解析时传入的服务名
    pub cache_key: String,
    pub instances: Vec<Instance>,
}
