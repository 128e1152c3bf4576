//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作以及文档内的资源本地化
//! - `css` - 样式表中 `url()` 引用的提取与替换
//! - `sanitizer` - 移除脚本并中和超链接

pub mod css;
pub mod html;
pub mod sanitizer;

pub use css::{extract_css_urls, localize_stylesheets, rewrite_css_urls};
pub use html::{html_to_dom, serialize_document};
pub use sanitizer::{sanitize, SanitizeReport};
