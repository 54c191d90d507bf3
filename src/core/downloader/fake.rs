use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use indicatif::ProgressBar;

use super::{DownloadWarning, Fetch, WarningReason};

/// Serves canned bodies by URL and records every download. Unknown URLs
/// answer 404.
pub struct FakeFetch {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetch {
    pub fn new(bodies: &[(&str, &str)]) -> Self {
        Self {
            bodies: bodies
                .iter()
                .map(|(url, body)| (url.to_string(), body.as_bytes().to_vec()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for FakeFetch {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressBar,
    ) -> Result<u64, DownloadWarning> {
        self.requests.lock().unwrap().push(url.to_string());
        let body = self
            .bodies
            .get(url)
            .ok_or_else(|| DownloadWarning::new(url, WarningReason::Rejected(404)))?;
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();
        std::fs::write(dest, body).unwrap();
        progress.inc(body.len() as u64);
        Ok(body.len() as u64)
    }

    async fn probe_size(&self, url: &str) -> Result<u64, DownloadWarning> {
        self.bodies
            .get(url)
            .map(|body| body.len() as u64)
            .ok_or_else(|| DownloadWarning::new(url, WarningReason::Rejected(404)))
    }
}
