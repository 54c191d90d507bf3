use std::error::Error as StdError;
use std::fmt;

/// Why a download (or size probe) did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningReason {
    /// The server answered with a non-success status, even after the retry.
    Rejected(u16),
    /// The host name could not be resolved.
    HostNotFound,
    Transport(String),
    Io(String),
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningReason::Rejected(status) => write!(f, "HTTP {}", status),
            WarningReason::HostNotFound => write!(f, "was not found"),
            WarningReason::Transport(message) => write!(f, "network error: {}", message),
            WarningReason::Io(message) => write!(f, "write error: {}", message),
        }
    }
}

/// A non-fatal download failure. The caller decides whether to aggregate
/// and report it or to escalate it into a [`LauncherError`].
///
/// [`LauncherError`]: crate::core::error::LauncherError
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{url} {reason}")]
pub struct DownloadWarning {
    pub url: String,
    pub reason: WarningReason,
}

impl DownloadWarning {
    pub fn new(url: &str, reason: WarningReason) -> Self {
        Self {
            url: url.to_string(),
            reason,
        }
    }

    pub fn transport(url: &str, err: &reqwest::Error) -> Self {
        let reason = if is_dns_failure(err) {
            WarningReason::HostNotFound
        } else {
            WarningReason::Transport(err.to_string())
        };
        Self::new(url, reason)
    }

    pub fn io(url: &str, err: std::io::Error) -> Self {
        Self::new(url, WarningReason::Io(err.to_string()))
    }

    pub fn is_host_not_found(&self) -> bool {
        self.reason == WarningReason::HostNotFound
    }
}

/// Walks the source chain looking for a name resolution failure.
fn is_dns_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
        {
            return true;
        }
        current = e.source();
    }
    false
}
