//! 错误类型转换实现

use super::{ErrorCode, RegistryError};

impl From<redis::RedisError> for RegistryError {
    fn from(err: redis::RedisError) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::StoreTimeout
        } else if err.is_connection_dropped() || err.is_connection_refusal() {
            ErrorCode::StoreConnectionLost
        } else {
            ErrorCode::StoreError
        };
        RegistryError::store_with_code(code, format!("redis: {}", err))
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::encoding(format!("JSON 序列化错误: {}", err))
    }
}

impl From<toml::de::Error> for RegistryError {
    fn from(err: toml::de::Error) -> Self {
        RegistryError::configuration(format!("TOML 解析错误: {}", err))
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::configuration(format!("IO 错误: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_encoding() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: RegistryError = err.into();
        assert_eq!(err.code(), ErrorCode::EncodingError);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_redis_error_maps_to_store() {
        let err = redis::RedisError::from((redis::ErrorKind::ResponseError, "WRONGTYPE"));
        let err: RegistryError = err.into();
        assert!(err.is_store_error());
        assert_eq!(err.code(), ErrorCode::StoreError);
    }

    #[test]
    fn test_io_timeout_maps_to_retryable_store_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "read timed out");
        let err: RegistryError = redis::RedisError::from(io).into();
        assert_eq!(err.code(), ErrorCode::StoreTimeout);
        assert!(err.is_retryable());
    }
}
