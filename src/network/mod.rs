//! # 网络模块
//!
//! 这个模块包含所有与资源下载和去重相关的功能：
//!
//! - HTTP会话管理、限速和资源落盘
//! - 单次任务内的资源缓存
//!
//! # 模块组织
//!
//! - `session` - HTTP传输抽象、请求处理、资源下载
//! - `cache` - 规范化URL到本地资源的映射

pub mod cache;
pub mod session;

// Re-export commonly used items for convenience
pub use self::cache::{CachedAsset, ResourceCache};
pub use self::session::{HttpTransport, NetworkError, Session, Transport};
