//! HTTP 会话
//!
//! 负责从远程主机获取资源并以流的方式写入本地文件。
//! 每次成功下载后会等待一段固定时间，以免对源站造成压力。

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::DemoizerOptions;
use crate::utils::url::CanonicalUrl;

/// Size of the buffer used for streaming response bodies to disk
pub const CHUNK_SIZE: usize = 8192;

/// Browser-like identification sent along with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Errors which can occur while fetching a single resource
///
/// None of these is fatal to the document being processed: the reference which
/// triggered the fetch simply keeps pointing at its remote location.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("unable to set up HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("unable to save {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The HTTP capability the session relies on
///
/// Implementations perform exactly one GET request and hand back the response body
/// as a stream. Any non-success status must be reported as an error.
pub trait Transport {
    fn get(&self, url: &CanonicalUrl) -> Result<Box<dyn Read>, NetworkError>;
}

/// Blocking `reqwest`-backed transport
pub struct HttpTransport {
    client: Client,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<HttpTransport, NetworkError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NetworkError::Client)?;

        Ok(HttpTransport {
            client,
            user_agent: user_agent.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &CanonicalUrl) -> Result<Box<dyn Read>, NetworkError> {
        let response = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|source| NetworkError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(response))
    }
}

/// Downloads resources one at a time, throttling requests made to the source host
pub struct Session {
    transport: Box<dyn Transport>,
    request_delay: Duration,
}

impl Session {
    /// Creates a session which talks HTTP using the given options
    pub fn new(options: &DemoizerOptions) -> Result<Session, NetworkError> {
        let user_agent: &str = options
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT);
        let transport = HttpTransport::new(user_agent, Duration::from_secs(options.timeout))?;

        Ok(Session::with_transport(
            Box::new(transport),
            options.request_delay,
        ))
    }

    /// Creates a session on top of any transport
    pub fn with_transport(transport: Box<dyn Transport>, request_delay: Duration) -> Session {
        Session {
            transport,
            request_delay,
        }
    }

    /// Fetches the URL and writes its body verbatim to `local_path`
    ///
    /// Parent directories get created as needed. A partially written file is removed
    /// if the transfer breaks off midway. Returns the number of bytes written.
    pub fn download(&self, url: &CanonicalUrl, local_path: &Path) -> Result<u64, NetworkError> {
        info!("Downloading: {}", url);

        let result = self
            .transport
            .get(url)
            .and_then(|mut body| save_body(&mut *body, local_path));

        match result {
            Ok(size) => {
                info!("Saved to: {} ({} bytes)", local_path.display(), size);

                if !self.request_delay.is_zero() {
                    thread::sleep(self.request_delay);
                }

                Ok(size)
            }
            Err(error) => {
                warn!("Failed to download {}: {}", url, error);
                Err(error)
            }
        }
    }
}

fn save_body(body: &mut dyn Read, local_path: &Path) -> Result<u64, NetworkError> {
    let io_error = |source: io::Error| NetworkError::Io {
        path: local_path.to_path_buf(),
        source,
    };

    if let Some(parent) = local_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }

    let mut file = File::create(local_path).map_err(io_error)?;

    match stream_to(body, &mut file) {
        Ok(size) => Ok(size),
        Err(source) => {
            drop(file);
            let _ = fs::remove_file(local_path);
            Err(io_error(source))
        }
    }
}

fn stream_to(body: &mut dyn Read, file: &mut File) -> io::Result<u64> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let count = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        file.write_all(&buffer[..count])?;
        written += count as u64;
    }

    file.flush()?;
    Ok(written)
}
