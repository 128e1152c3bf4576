// 集成测试公共模块
//
// 提供不访问网络的传输层替身以及常用的测试夹具

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use tempfile::TempDir;

use demoizer::network::{NetworkError, Session, Transport};
use demoizer::utils::CanonicalUrl;
use demoizer::{DemoizerOptions, DocumentProcessor, Job};

/// 按 URL 返回预设响应的传输层，未登记的 URL 一律返回 404
#[derive(Default)]
pub struct MockTransport {
    responses: HashMap<String, Result<Vec<u8>, u16>>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: &[u8]) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_vec()));
        self
    }

    pub fn fail(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }

    pub fn requests(&self) -> Rc<RefCell<Vec<String>>> {
        self.requests.clone()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &CanonicalUrl) -> Result<Box<dyn Read>, NetworkError> {
        self.requests.borrow_mut().push(url.to_string());

        match self.responses.get(url.as_str()) {
            Some(Ok(body)) => Ok(Box::new(Cursor::new(body.clone()))),
            Some(Err(status)) => Err(NetworkError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(NetworkError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// 临时工作目录，资源保存在其中的 `resources/` 下
pub struct Workspace {
    pub dir: TempDir,
    pub requests: Rc<RefCell<Vec<String>>>,
    pub processor: DocumentProcessor,
}

impl Workspace {
    pub fn new(transport: MockTransport) -> Workspace {
        let dir = tempfile::tempdir().unwrap();
        let requests = transport.requests();
        let options = DemoizerOptions {
            resources_dir: dir.path().join("resources"),
            request_delay: Duration::ZERO,
            ..Default::default()
        };
        let session = Session::with_transport(Box::new(transport), Duration::ZERO);

        Workspace {
            dir,
            requests,
            processor: DocumentProcessor::new(session, options),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write_input(&self, name: &str, html: &str) {
        fs::write(self.path(name), html).unwrap();
    }

    pub fn job(&self, input: &str, output: &str, base_url: &str) -> Job {
        Job::new(self.path(input), self.path(output)).with_base_url(base_url)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// 资源目录下以 `prefix` 开头的唯一文件
    pub fn resource(&self, prefix: &str) -> PathBuf {
        let matches: Vec<PathBuf> = fs::read_dir(self.path("resources"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(prefix))
            })
            .collect();

        assert_eq!(matches.len(), 1, "expected exactly one resource named {}*", prefix);
        matches[0].clone()
    }

    pub fn resource_count(&self) -> usize {
        match fs::read_dir(self.path("resources")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}
