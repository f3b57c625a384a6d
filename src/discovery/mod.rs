//! 服务发现模块
//!
//! 提供服务实例定义和直接读取存储的解析器

pub mod instance;
pub mod resolver;

pub use instance::{DEFAULT_WEIGHT, Instance, ResolveResult, TargetInfo};
pub use resolver::Resolver;
