//! 错误代码和错误类别定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 注册中心错误代码
///
/// 错误代码按类别分组，每个类别占用1000个代码范围：
/// - 1000-1999: 请求相关错误
/// - 2000-2999: 生命周期相关错误
/// - 6000-6999: 存储相关错误
/// - 8000-8999: 序列化相关错误
/// - 9000-9999: 通用错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum ErrorCode {
    // ============================================================
    // 请求相关错误 (1000-1999)
    // ============================================================
    InvalidRequest = 1000,

    // ============================================================
    // 生命周期相关错误 (2000-2999)
    // ============================================================
    NotRegistered = 2000,
    AlreadyRegistered = 2001,

    // ============================================================
    // 存储相关错误 (6000-6999)
    // ============================================================
    StoreError = 6000,
    StoreTimeout = 6001,
    StoreConnectionLost = 6002,

    // ============================================================
    // 序列化相关错误 (8000-8999)
    // ============================================================
    EncodingError = 8000,

    // ============================================================
    // 通用错误 (9000-9999)
    // ============================================================
    ConfigurationError = 9000,
    UnknownError = 9999,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ErrorCode {
    /// 获取错误代码的数字值
    #[inline]
    pub fn as_u32(&self) -> u32 {
        *self as u32
    }

    /// 从数字值创建错误代码
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            1000 => Some(ErrorCode::InvalidRequest),
            2000 => Some(ErrorCode::NotRegistered),
            2001 => Some(ErrorCode::AlreadyRegistered),
            6000 => Some(ErrorCode::StoreError),
            6001 => Some(ErrorCode::StoreTimeout),
            6002 => Some(ErrorCode::StoreConnectionLost),
            8000 => Some(ErrorCode::EncodingError),
            9000 => Some(ErrorCode::ConfigurationError),
            9999 => Some(ErrorCode::UnknownError),
            _ => None,
        }
    }

    /// 获取错误代码的英文标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::NotRegistered => "NOT_REGISTERED",
            ErrorCode::AlreadyRegistered => "ALREADY_REGISTERED",
            ErrorCode::StoreError => "STORE_ERROR",
            ErrorCode::StoreTimeout => "STORE_TIMEOUT",
            ErrorCode::StoreConnectionLost => "STORE_CONNECTION_LOST",
            ErrorCode::EncodingError => "ENCODING_ERROR",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// 获取错误代码的类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_u32() {
            1000..=1999 => ErrorCategory::Request,
            2000..=2999 => ErrorCategory::Lifecycle,
            6000..=6999 => ErrorCategory::Store,
            8000..=8999 => ErrorCategory::Serialization,
            _ => ErrorCategory::General,
        }
    }

    /// 判断是否为可重试的错误
    ///
    /// 本库自身从不重试，这里只给调用方提供判断依据
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::StoreTimeout | ErrorCode::StoreConnectionLost
        )
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Request,
    Lifecycle,
    Store,
    Serialization,
    General,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Request => write!(f, "REQUEST"),
            ErrorCategory::Lifecycle => write!(f, "LIFECYCLE"),
            ErrorCategory::Store => write!(f, "STORE"),
            ErrorCategory::Serialization => write!(f, "SERIALIZATION"),
            ErrorCategory::General => write!(f, "GENERAL"),
        }
    }
}
