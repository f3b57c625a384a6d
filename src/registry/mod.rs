//! 服务注册模块
//!
//! 注册器负责写入、续期和注销本实例的记录，成员缓存负责跟踪同服务的其他实例

pub mod events;
mod keep_alive;
pub mod lifecycle;
pub mod mentor;

pub use events::{BackgroundFailure, LoopKind};
pub use lifecycle::Registry;
pub use mentor::Mentor;
