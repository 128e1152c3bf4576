//! # Demoizer Library
//!
//! 将抓取下来的网页冻结为可离线浏览、不可交互的静态快照：
//! 下载并本地化所有外部资源，移除脚本，并中和所有超链接。
//!
//! ## 模块组织
//!
//! - `core` - 任务编排和主要处理逻辑
//! - `config` - 任务配置（命令行或 JSON 文件）
//! - `env` - 环境变量
//! - `localizer` - 各重写步骤共用的资源本地化
//! - `parsers` - HTML、CSS 处理与文档净化
//! - `network` - 资源下载和缓存
//! - `utils` - URL 解析与本地文件名生成

pub mod config;
pub mod core;
pub mod env;
pub mod localizer;
pub mod network;
pub mod parsers;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::config::{load_jobs, parse_jobs, Job};
pub use crate::core::{
    run_all, DemoizerError, DemoizerOptions, DocumentProcessor, JobReport, RunSummary,
};
pub use crate::localizer::Localizer;
pub use crate::network::{CachedAsset, HttpTransport, NetworkError, ResourceCache, Session, Transport};
