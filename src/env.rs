//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，命令行参数的优先级高于环境变量

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::constants::{DEFAULT_REQUEST_DELAY, DEFAULT_RESOURCES_DIR, DEFAULT_TIMEOUT};
use crate::core::DemoizerOptions;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "DEMOIZER_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 下载会话相关环境变量
pub mod session {
    use super::*;

    /// 资源目录
    pub struct ResourcesDir;
    impl EnvVar<PathBuf> for ResourcesDir {
        const NAME: &'static str = "DEMOIZER_RESOURCES_DIR";
        const DEFAULT: Option<PathBuf> = None;

        fn get() -> EnvResult<PathBuf> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(PathBuf::from(DEFAULT_RESOURCES_DIR)),
            }
        }
        const DESCRIPTION: &'static str = "Directory downloaded resources are saved into";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Directory cannot be empty".to_string(),
                });
            }
            Ok(PathBuf::from(dir))
        }
    }

    /// User-Agent 请求头
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "DEMOIZER_USER_AGENT";
        const DEFAULT: Option<String> = None; // 未设置时使用内置的浏览器标识
        const DESCRIPTION: &'static str = "User-Agent header sent along with every request";

        fn parse(value: &str) -> EnvResult<String> {
            let user_agent = value.trim();
            if user_agent.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User-Agent cannot be empty".to_string(),
                });
            }
            Ok(user_agent.to_string())
        }
    }

    /// 请求超时
    pub struct Timeout;
    impl EnvVar<u64> for Timeout {
        const NAME: &'static str = "DEMOIZER_TIMEOUT";
        const DEFAULT: Option<u64> = Some(DEFAULT_TIMEOUT);
        const DESCRIPTION: &'static str = "Request timeout in seconds";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_bounded_u64(value, Self::NAME, 1, 300)
        }
    }

    /// 两次下载之间的间隔
    pub struct RequestDelayMs;
    impl EnvVar<Duration> for RequestDelayMs {
        const NAME: &'static str = "DEMOIZER_REQUEST_DELAY_MS";
        const DEFAULT: Option<Duration> = Some(DEFAULT_REQUEST_DELAY);
        const DESCRIPTION: &'static str = "Pause after each successful download in milliseconds";

        fn parse(value: &str) -> EnvResult<Duration> {
            parse_bounded_u64(value, Self::NAME, 0, 60_000).map(Duration::from_millis)
        }
    }
}

/// 辅助函数
fn parse_bounded_u64(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    let num: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 日志配置
    pub log_level: String,
    pub no_color: bool,

    // 会话配置
    pub resources_dir: PathBuf,
    pub user_agent: Option<String>,
    pub timeout: u64,
    pub request_delay: Duration,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            resources_dir: session::ResourcesDir::get()?,
            user_agent: match env::var(session::UserAgent::NAME) {
                Ok(value) => Some(session::UserAgent::parse(&value)?),
                Err(_) => None,
            },
            timeout: session::Timeout::get()?,
            request_delay: session::RequestDelayMs::get()?,
        })
    }

    /// 转换为处理选项
    pub fn options(&self) -> DemoizerOptions {
        DemoizerOptions {
            resources_dir: self.resources_dir.clone(),
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            request_delay: self.request_delay,
            ..Default::default()
        }
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("Environment variables:\n");

    for (name, description) in [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION),
        (session::ResourcesDir::NAME, session::ResourcesDir::DESCRIPTION),
        (session::UserAgent::NAME, session::UserAgent::DESCRIPTION),
        (session::Timeout::NAME, session::Timeout::DESCRIPTION),
        (session::RequestDelayMs::NAME, session::RequestDelayMs::DESCRIPTION),
    ] {
        docs.push_str(&format!("  {:<28}{}\n", name, description));
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert_eq!(core::LogLevel::parse("warn").unwrap(), "warn");
        assert!(core::LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_no_color_parsing() {
        assert!(core::NoColor::parse("1").unwrap());
        assert!(!core::NoColor::parse("").unwrap());
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(session::Timeout::parse("30").unwrap(), 30);
        assert!(session::Timeout::parse("0").is_err());
        assert!(session::Timeout::parse("301").is_err());
        assert!(session::Timeout::parse("ten").is_err());

        assert_eq!(
            session::RequestDelayMs::parse("0").unwrap(),
            Duration::ZERO
        );
        assert_eq!(
            session::RequestDelayMs::parse("250").unwrap(),
            Duration::from_millis(250)
        );
        assert!(session::RequestDelayMs::parse("-1").is_err());
    }

    #[test]
    fn test_path_and_user_agent_validation() {
        assert_eq!(
            session::ResourcesDir::parse(" assets ").unwrap(),
            PathBuf::from("assets")
        );
        assert!(session::ResourcesDir::parse("  ").is_err());
        assert!(session::UserAgent::parse("").is_err());
    }

    #[test]
    fn test_env_config_loading() {
        env::set_var("DEMOIZER_TIMEOUT", "25");
        env::set_var("DEMOIZER_RESOURCES_DIR", "assets");

        let config = EnvConfig::from_env().unwrap();
        let options = config.options();
        assert_eq!(options.timeout, 25);
        assert_eq!(options.resources_dir, PathBuf::from("assets"));
        assert!(options.encoding.is_none());

        env::remove_var("DEMOIZER_TIMEOUT");
        env::remove_var("DEMOIZER_RESOURCES_DIR");
    }

    #[test]
    fn test_env_docs_lists_variables() {
        let docs = generate_env_docs();

        assert!(docs.contains("DEMOIZER_LOG_LEVEL"));
        assert!(docs.contains("DEMOIZER_REQUEST_DELAY_MS"));
    }
}
