use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use encoding_rs::Encoding;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::constants::{
    DEFAULT_REQUEST_DELAY, DEFAULT_RESOURCES_DIR, DEFAULT_TIMEOUT,
};
use crate::config::Job;
use crate::localizer::Localizer;
use crate::network::cache::ResourceCache;
use crate::network::session::{NetworkError, Session};
use crate::parsers::css::localize_stylesheets;
use crate::parsers::html::{
    html_to_dom, localize_attributes, localize_style_attributes, localize_style_blocks,
    serialize_document,
};
use crate::parsers::sanitizer::{sanitize, SanitizeReport};

/// Encoding assumed for input documents unless told otherwise
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Represents errors that can occur while demoizing documents
///
/// Configuration problems are fatal for the whole run, everything else only
/// fails the job it happened in.
#[derive(Debug, Error)]
pub enum DemoizerError {
    #[error("{0}")]
    Config(String),

    #[error("input file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    #[error("invalid base URL \"{url}\": {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to serialize document: {0}")]
    Serialize(#[source] io::Error),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Options shared by every job of one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoizerOptions {
    /// 下载资源的存放目录
    pub resources_dir: PathBuf,
    pub user_agent: Option<String>,
    /// 请求超时（秒）
    pub timeout: u64,
    /// 每次成功下载后的等待时间
    pub request_delay: Duration,
    /// 输入和输出文档的编码，默认 UTF-8
    pub encoding: Option<String>,
}

impl Default for DemoizerOptions {
    fn default() -> Self {
        DemoizerOptions {
            resources_dir: PathBuf::from(DEFAULT_RESOURCES_DIR),
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            encoding: None,
        }
    }
}

/// Outcome of one successfully processed job
#[derive(Debug, Default, PartialEq, Eq)]
pub struct JobReport {
    /// 本地化的不同资源数量
    pub resources: usize,
    pub scripts_removed: usize,
    pub links_rewritten: usize,
}

/// Outcome of a whole run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub resources: usize,
}

/// 编码验证器
pub struct EncodingValidator;

impl EncodingValidator {
    pub fn validate_options(options: &DemoizerOptions) -> Result<(), DemoizerError> {
        if let Some(encoding) = &options.encoding {
            if Encoding::for_label_no_replacement(encoding.as_bytes()).is_none() {
                return Err(DemoizerError::Config(format!(
                    "unknown encoding \"{}\"",
                    encoding
                )));
            }
        }

        if options.timeout == 0 {
            return Err(DemoizerError::Config(
                "timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// 文档处理器，负责协调整个文档处理流程
pub struct DocumentProcessor {
    session: Session,
    options: DemoizerOptions,
}

impl DocumentProcessor {
    pub fn new(session: Session, options: DemoizerOptions) -> Self {
        Self { session, options }
    }

    fn encoding(&self) -> &str {
        self.options.encoding.as_deref().unwrap_or(DEFAULT_ENCODING)
    }

    /// 处理单个任务：读取、本地化资源、净化并写出文档
    ///
    /// 输出文件只在整个流程成功后写入一次。
    pub fn process(&self, job: &Job) -> Result<JobReport, DemoizerError> {
        info!("Processing {} -> {}", job.input.display(), job.output.display());
        info!("  Base URL: {}", job.base_url);

        // 1. 解析基础URL并读取输入
        let base_url: Url =
            Url::parse(&job.base_url).map_err(|source| DemoizerError::InvalidBaseUrl {
                url: job.base_url.clone(),
                source,
            })?;

        let data: Vec<u8> = fs::read(&job.input).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DemoizerError::InputNotFound(job.input.clone())
            } else {
                DemoizerError::Read {
                    path: job.input.clone(),
                    source,
                }
            }
        })?;

        fs::create_dir_all(&self.options.resources_dir).map_err(|source| {
            DemoizerError::Write {
                path: self.options.resources_dir.clone(),
                source,
            }
        })?;

        let dom = html_to_dom(&data, self.encoding()).map_err(|source| DemoizerError::Parse {
            path: job.input.clone(),
            source,
        })?;

        // 2. 依次执行四个重写步骤，共享同一个缓存
        let output_dir: &Path = job.output.parent().unwrap_or(Path::new(""));
        let mut cache = ResourceCache::new();
        {
            let mut localizer = Localizer::new(
                &self.session,
                &mut cache,
                &self.options.resources_dir,
                output_dir,
            );

            localize_attributes(&dom.document, &base_url, &mut localizer);
            localize_stylesheets(&mut localizer);
            localize_style_blocks(&dom.document, &base_url, &mut localizer);
            localize_style_attributes(&dom.document, &base_url, &mut localizer);
        }

        // 3. 移除脚本并中和链接
        let SanitizeReport {
            scripts_removed,
            links_rewritten,
        } = sanitize(&dom.document, &job.link_replacement);

        // 4. 序列化并写出
        let html: Vec<u8> =
            serialize_document(dom, self.encoding()).map_err(DemoizerError::Serialize)?;
        write_output(&job.output, &html)?;

        info!("Completed processing: {}", job.output.display());
        if cache.is_empty() {
            info!("  No external resources found");
        } else {
            info!("  Downloaded {} resources", cache.len());
        }

        Ok(JobReport {
            resources: cache.len(),
            scripts_removed,
            links_rewritten,
        })
    }

    /// 按顺序处理所有任务，单个任务失败不会中断整个运行
    pub fn run_all(&self, jobs: &[Job]) -> RunSummary {
        let mut summary = RunSummary::default();

        for job in jobs {
            match self.process(job) {
                Ok(report) => {
                    summary.succeeded += 1;
                    summary.resources += report.resources;
                }
                Err(DemoizerError::InputNotFound(path)) => {
                    warn!("Input file '{}' not found, skipping", path.display());
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!("Error processing {}: {}", job.input.display(), e);
                    summary.failed += 1;
                }
            }
        }

        info!("All files processed!");
        summary
    }
}

/// 先写入同目录下的临时文件再重命名，输出文件要么完整写出，要么保持不变
fn write_output(path: &Path, html: &[u8]) -> Result<(), DemoizerError> {
    let io_error = |source: io::Error| DemoizerError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent: &Path = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io_error)?;
            parent
        }
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(parent).map_err(io_error)?;
    file.write_all(html).map_err(io_error)?;

    // 临时文件默认只有属主可读
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(io_error)?;
    }

    file.persist(path).map_err(|e| io_error(e.error))?;

    Ok(())
}

/// Processes all jobs over plain HTTP
///
/// Fails only when the options themselves are unusable, individual job failures
/// are reported through the returned summary.
pub fn run_all(jobs: &[Job], options: &DemoizerOptions) -> Result<RunSummary, DemoizerError> {
    EncodingValidator::validate_options(options)?;

    let session = Session::new(options)?;
    let processor = DocumentProcessor::new(session, options.clone());

    Ok(processor.run_all(jobs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DemoizerOptions::default();

        assert_eq!(options.resources_dir, PathBuf::from("resources"));
        assert_eq!(options.timeout, 10);
        assert_eq!(options.request_delay, Duration::from_millis(100));
        assert!(options.user_agent.is_none());
    }

    #[test]
    fn test_validate_options() {
        assert!(EncodingValidator::validate_options(&DemoizerOptions::default()).is_ok());

        let options = DemoizerOptions {
            encoding: Some("windows-1251".to_string()),
            ..Default::default()
        };
        assert!(EncodingValidator::validate_options(&options).is_ok());

        let options = DemoizerOptions {
            encoding: Some("utf-42".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            EncodingValidator::validate_options(&options),
            Err(DemoizerError::Config(_))
        ));

        let options = DemoizerOptions {
            timeout: 0,
            ..Default::default()
        };
        assert!(EncodingValidator::validate_options(&options).is_err());
    }

    #[test]
    fn test_write_output_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages").join("out.html");

        write_output(&path, b"<p>first version, rather long</p>").unwrap();
        write_output(&path, b"<p>second</p>").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"<p>second</p>");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_output_failure_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        fs::create_dir(&path).unwrap();

        let result = write_output(&path, b"<p>Hi</p>");

        assert!(matches!(result, Err(DemoizerError::Write { .. })));
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_input_not_found_message() {
        let error = DemoizerError::InputNotFound(PathBuf::from("missing.html"));

        assert_eq!(error.to_string(), "input file 'missing.html' not found");
    }
}
