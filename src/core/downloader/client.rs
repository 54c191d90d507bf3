use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::ProgressBar;
use reqwest::{Client, Response};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::warning::{DownloadWarning, WarningReason};
use crate::core::error::LauncherResult;
use crate::core::http::{browser_headers, build_http_client};

/// The "download a URL to a path" capability.
///
/// `fetch` streams the body to `dest`, advances `progress` by every chunk
/// written and returns the number of bytes written.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressBar,
    ) -> Result<u64, DownloadWarning>;

    /// Size of the body behind `url` without downloading it. A missing
    /// `Content-Length` counts as 0 bytes.
    async fn probe_size(&self, url: &str) -> Result<u64, DownloadWarning>;
}

/// Sequential, streaming HTTP downloader.
///
/// A request answered with a 4xx is retried exactly once with browser-like
/// headers. Server errors and transport failures are not retried.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> LauncherResult<Self> {
        Ok(Self::with_client(build_http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    // ── Requests ────────────────────────────────────────

    async fn get(&self, url: &str) -> Result<Response, DownloadWarning> {
        let first = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadWarning::transport(url, &e))?;

        let response = if first.status().is_client_error() {
            debug!(
                "{} answered {}, retrying with browser headers",
                url,
                first.status()
            );
            self.client
                .get(url)
                .headers(browser_headers())
                .send()
                .await
                .map_err(|e| DownloadWarning::transport(url, &e))?
        } else {
            first
        };

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadWarning::new(
                url,
                WarningReason::Rejected(status.as_u16()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetch for Downloader {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressBar,
    ) -> Result<u64, DownloadWarning> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadWarning::io(url, e))?;
        }

        let response = self.get(url).await?;

        match write_body(url, response, dest, progress).await {
            Ok(written) => {
                debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
                Ok(written)
            }
            Err(warning) => {
                // A partial file would be mistaken for a finished one next run.
                let _ = tokio::fs::remove_file(dest).await;
                Err(warning)
            }
        }
    }

    async fn probe_size(&self, url: &str) -> Result<u64, DownloadWarning> {
        let response = self.get(url).await?;
        Ok(response.content_length().unwrap_or(0))
    }
}

async fn write_body(
    url: &str,
    response: Response,
    dest: &Path,
    progress: &ProgressBar,
) -> Result<u64, DownloadWarning> {
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| DownloadWarning::io(url, e))?;

    let mut stream = response.bytes_stream();
    let mut written = 0_u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DownloadWarning::transport(url, &e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadWarning::io(url, e))?;
        written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }

    file.flush().await.map_err(|e| DownloadWarning::io(url, e))?;
    Ok(written)
}
