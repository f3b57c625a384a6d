//! 注册记录编解码
//!
//! 存储 key、field、value 以及通知消息的格式是跨进程的线上协议，
//! 所有使用同一存储的进程必须逐字节一致。

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::error::Result;
use crate::types::Info;

pub const PODCHAOS: &str = "podchaos";
pub const SERVER: &str = "server";
pub const REGISTER: &str = "register";
pub const DEREGISTER: &str = "deregister";

/// 存储中的注册记录
///
/// 解码时缺失的字段取零值，`tags` 为 `null` 时视为空
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryInfo {
    pub service_name: String,
    pub addr: String,
    pub weight: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub tags: HashMap<String, String>,
}

fn null_as_empty<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 一条待写入的 hash 记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryHash {
    pub key: String,
    pub field: String,
    pub value: String,
}

/// 生成服务的存储 key，同时作为通知频道名
pub fn generate_key(service_name: &str, service_type: &str) -> String {
    format!("/{}/{}/{}", PODCHAOS, service_name, service_type)
}

/// 服务实例表的 key
pub fn service_key(service_name: &str) -> String {
    generate_key(service_name, SERVER)
}

pub fn generate_msg(msg_type: &str, service_name: &str, service_addr: &str) -> String {
    format!("{}-{}-{}", msg_type, service_name, service_addr)
}

/// 由注册信息生成存储记录
///
/// 调用方需先完成 `Info::validate`
pub fn prepare_registry_hash(info: &Info) -> Result<RegistryHash> {
    let record = convert_info(info);
    let value = serde_json::to_string(&record)?;
    Ok(RegistryHash {
        key: service_key(&info.service_name),
        field: record.addr,
        value,
    })
}

fn convert_info(info: &Info) -> RegistryInfo {
    RegistryInfo {
        service_name: info.service_name.clone(),
        addr: info
            .addr
            .as_ref()
            .map(|addr| addr.to_string())
            .unwrap_or_default(),
        weight: info.weight,
        tags: info.tags.clone(),
    }
}

/// 成员变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Register { service_name: String, addr: String },
    Deregister { service_name: String, addr: String },
}

impl Notification {
    pub fn register(service_name: impl Into<String>, addr: impl Into<String>) -> Self {
        Notification::Register {
            service_name: service_name.into(),
            addr: addr.into(),
        }
    }

    pub fn deregister(service_name: impl Into<String>, addr: impl Into<String>) -> Self {
        Notification::Deregister {
            service_name: service_name.into(),
            addr: addr.into(),
        }
    }

    /// 解析 `<verb>-<serviceName>-<addr>`
    ///
    /// 只接受恰好三段且动词已知的消息，其余格式返回 `None`
    pub fn parse(payload: &str) -> Option<Self> {
        let split: Vec<&str> = payload.split('-').collect();
        let [verb, service_name, addr] = split.as_slice() else {
            return None;
        };
        if service_name.is_empty() || addr.is_empty() {
            return None;
        }
        match *verb {
            REGISTER => Some(Self::register(*service_name, *addr)),
            DEREGISTER => Some(Self::deregister(*service_name, *addr)),
            _ => None,
        }
    }

    pub fn service_name(&self) -> &str {
        match self {
            Notification::Register { service_name, .. }
            | Notification::Deregister { service_name, .. } => service_name,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Notification::Register { service_name, addr } => {
                generate_msg(REGISTER, service_name, addr)
            }
            Notification::Deregister { service_name, addr } => {
                generate_msg(DEREGISTER, service_name, addr)
            }
        }
    }
}
