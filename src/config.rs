//! 任务配置
//!
//! 任务既可以来自命令行（单个任务），也可以来自 JSON 配置文件（多个任务）：
//!
//! ```json
//! [
//!   {
//!     "input_filename": "GoogleRaw.html",
//!     "output_filename": "Google.html",
//!     "link_replacement": "SearchResults.html",
//!     "base_url": "https://www.google.com"
//!   }
//! ]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::DemoizerError;

/// 配置相关常量
pub mod constants {
    use std::time::Duration;

    pub const DEFAULT_CONFIG_FILE: &str = "demoizer_settings.json";
    pub const DEFAULT_LINK_REPLACEMENT: &str = "#";
    pub const DEFAULT_BASE_URL: &str = "https://www.google.com";
    pub const DEFAULT_RESOURCES_DIR: &str = "resources";
    /// 秒
    pub const DEFAULT_TIMEOUT: u64 = 10;
    pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);
}

use self::constants::{DEFAULT_BASE_URL, DEFAULT_LINK_REPLACEMENT};

/// One document to demoize
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Job {
    #[serde(rename = "input_filename")]
    pub input: PathBuf,
    #[serde(rename = "output_filename")]
    pub output: PathBuf,
    /// Value every hyperlink target gets replaced with
    #[serde(default = "default_link_replacement")]
    pub link_replacement: String,
    /// URL relative references within the document are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_link_replacement() -> String {
    DEFAULT_LINK_REPLACEMENT.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Job {
    pub fn new<I, O>(input: I, output: O) -> Job
    where
        I: Into<PathBuf>,
        O: Into<PathBuf>,
    {
        Job {
            input: input.into(),
            output: output.into(),
            link_replacement: default_link_replacement(),
            base_url: default_base_url(),
        }
    }

    pub fn with_link_replacement(mut self, link_replacement: &str) -> Job {
        self.link_replacement = link_replacement.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Job {
        self.base_url = base_url.to_string();
        self
    }
}

/// Parses a JSON job list
///
/// An empty list is treated as a configuration error, same as malformed JSON.
pub fn parse_jobs(json: &str) -> Result<Vec<Job>, DemoizerError> {
    let jobs: Vec<Job> = serde_json::from_str(json)
        .map_err(|e| DemoizerError::Config(format!("invalid JSON in configuration: {}", e)))?;

    if jobs.is_empty() {
        return Err(DemoizerError::Config(
            "configuration does not list any files to process".to_string(),
        ));
    }

    Ok(jobs)
}

/// Reads the job list from a JSON configuration file
pub fn load_jobs(path: &Path) -> Result<Vec<Job>, DemoizerError> {
    let json: String = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DemoizerError::Config(format!(
            "configuration file '{}' not found, please create it or pass --input and --output",
            path.display()
        )),
        _ => DemoizerError::Config(format!(
            "unable to read configuration file '{}': {}",
            path.display(),
            e
        )),
    })?;

    parse_jobs(&json).map_err(|e| match e {
        DemoizerError::Config(message) => {
            DemoizerError::Config(format!("{} ({})", message, path.display()))
        }
        other => other,
    })
}
