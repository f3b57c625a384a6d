//! 注册中心统一错误类型

use super::code::ErrorCode;
use thiserror::Error;

/// 注册中心统一错误类型
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    /// 注册信息缺少服务名或地址
    #[error("无效请求: {0}")]
    InvalidRequest(String),

    /// 注册记录 JSON 编码失败
    #[error("编码错误: {0}")]
    Encoding(String),

    /// 后端存储操作失败
    #[error("存储错误 [{code}] {reason}", code = .code.as_str())]
    Store { code: ErrorCode, reason: String },

    /// 在没有活跃注册的情况下注销
    #[error("服务未注册: {0}")]
    NotRegistered(String),

    /// 已存在活跃注册
    #[error("服务已注册: {0}")]
    AlreadyRegistered(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Configuration(String),
}

impl RegistryError {
    /// 创建无效请求错误
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        RegistryError::InvalidRequest(reason.into())
    }

    /// 创建编码错误
    pub fn encoding(reason: impl Into<String>) -> Self {
        RegistryError::Encoding(reason.into())
    }

    /// 创建存储错误
    pub fn store(reason: impl Into<String>) -> Self {
        Self::store_with_code(ErrorCode::StoreError, reason)
    }

    /// 创建带具体代码的存储错误
    pub fn store_with_code(code: ErrorCode, reason: impl Into<String>) -> Self {
        RegistryError::Store {
            code,
            reason: reason.into(),
        }
    }

    /// 创建未注册错误
    pub fn not_registered(service_name: impl Into<String>) -> Self {
        RegistryError::NotRegistered(service_name.into())
    }

    /// 创建已注册错误
    pub fn already_registered(service_name: impl Into<String>) -> Self {
        RegistryError::AlreadyRegistered(service_name.into())
    }

    /// 创建配置错误
    pub fn configuration(reason: impl Into<String>) -> Self {
        RegistryError::Configuration(reason.into())
    }

    /// 获取错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            RegistryError::Encoding(_) => ErrorCode::EncodingError,
            RegistryError::Store { code, .. } => *code,
            RegistryError::NotRegistered(_) => ErrorCode::NotRegistered,
            RegistryError::AlreadyRegistered(_) => ErrorCode::AlreadyRegistered,
            RegistryError::Configuration(_) => ErrorCode::ConfigurationError,
        }
    }

    /// 获取错误原因
    pub fn reason(&self) -> &str {
        match self {
            RegistryError::InvalidRequest(msg)
            | RegistryError::Encoding(msg)
            | RegistryError::NotRegistered(msg)
            | RegistryError::AlreadyRegistered(msg)
            | RegistryError::Configuration(msg) => msg,
            RegistryError::Store { reason, .. } => reason,
        }
    }

    /// 是否为存储层错误
    pub fn is_store_error(&self) -> bool {
        matches!(self, RegistryError::Store { .. })
    }

    /// 判断是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, RegistryError>;
