use indicatif::ProgressBar;
use tracing::{debug, info};

use super::plan::MediaPlan;
use crate::core::downloader::{DownloadWarning, Fetch};
use crate::core::error::{LauncherError, LauncherResult};

/// What [`download_files`] did.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub downloaded: usize,
    /// Files already present and left untouched.
    pub skipped: usize,
    /// Planned files for this side.
    pub total: usize,
    pub warnings: Vec<DownloadWarning>,
}

/// Download every planned file that is not installed yet.
///
/// Existing files are never overwritten or re-verified. A failed download is
/// recorded as a warning and the run moves on; only filesystem errors while
/// creating the media folders abort it.
pub async fn download_files<F: Fetch + ?Sized>(
    plan: &MediaPlan,
    fetcher: &F,
    progress: &ProgressBar,
) -> LauncherResult<DownloadReport> {
    for folder in &plan.folders {
        std::fs::create_dir_all(folder).map_err(|e| LauncherError::io(folder, e))?;
    }

    let mut report = DownloadReport {
        total: plan.len(),
        ..DownloadReport::default()
    };

    for item in &plan.items {
        if item.is_installed() {
            report.skipped += 1;
            progress.inc(item.size);
            progress.set_message(format!("{} is already installed, skipping...", item.file_name));
            continue;
        }

        progress.set_message(format!("Downloading {}...", item.file_name));
        match fetcher.fetch(&item.url, &item.dest, progress).await {
            Ok(_) => report.downloaded += 1,
            Err(warning) => {
                debug!("Could not download {}: {}", item.file_name, warning);
                report.warnings.push(warning);
            }
        }
    }

    info!(
        "Media done: {} downloaded, {} skipped, {} failed",
        report.downloaded,
        report.skipped,
        report.warnings.len()
    );
    Ok(report)
}
