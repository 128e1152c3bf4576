//! # 工具模块
//!
//! 这个模块包含定位远程资源所需的纯函数：
//!
//! - `url` - 引用解析、协议过滤、规范化URL
//! - `filename` - 根据规范化URL生成确定性的本地文件名

pub mod filename;
pub mod url;

// Re-export commonly used items for convenience
pub use self::filename::{create_local_filename, relative_reference, url_hash};
pub use self::url::{is_skippable_reference, resolve_reference, CanonicalUrl, Url};
