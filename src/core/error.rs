use std::path::PathBuf;
use thiserror::Error;

use crate::core::downloader::{DownloadWarning, WarningReason};

/// Central error type for the installer backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Library {name} could not be downloaded: {reason}")]
    LibraryDownload { name: String, reason: String },

    // ── Input ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    #[error("Processor argument {template:?} references unknown variable {{{key}}}")]
    MissingVariable { key: String, template: String },

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Preconditions ───────────────────────────────────
    #[error(
        "Java was not found ({0}). Please make sure you have Java installed \
         and it is properly configured in your PATH."
    )]
    JavaNotFound(String),

    #[error("Launch the launcher once before installing forge ({0:?} does not exist)")]
    LauncherNotInitialized(PathBuf),

    // ── Java ────────────────────────────────────────────
    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    #[error("Processor {jar} failed (code {code:?})\n{stderr}")]
    ProcessorFailed {
        jar: String,
        code: Option<i32>,
        stderr: String,
    },

    // ── Loader ──────────────────────────────────────────
    #[error("Loader error: {0}")]
    Loader(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl From<DownloadWarning> for LauncherError {
    fn from(warning: DownloadWarning) -> Self {
        match warning.reason {
            WarningReason::Rejected(status) => LauncherError::DownloadFailed {
                url: warning.url,
                status,
            },
            _ => LauncherError::Other(warning.to_string()),
        }
    }
}
