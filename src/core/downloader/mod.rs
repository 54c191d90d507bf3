mod client;
#[cfg(test)]
pub(crate) mod fake;
mod warning;

pub use client::{Downloader, Fetch};
pub use warning::{DownloadWarning, WarningReason};
