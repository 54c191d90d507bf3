// ─── Progress Bars ───
// Terminal progress rendering shared by downloads and processors.
// Bars draw on stdout; logs own stderr.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BYTES_TEMPLATE: &str =
    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const ITEMS_TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {pos}/{len}";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

fn stdout_bar(total: u64) -> ProgressBar {
    ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stdout())
}

/// A byte-unit bar for downloads of `total` bytes.
pub fn bytes_bar(total: u64, title: &str) -> ProgressBar {
    let pb = stdout_bar(total);
    pb.set_style(style(BYTES_TEMPLATE));
    pb.set_message(title.to_string());
    pb
}

/// A counting bar for `total` discrete steps.
pub fn items_bar(total: u64, title: &str) -> ProgressBar {
    let pb = stdout_bar(total);
    pb.set_style(style(ITEMS_TEMPLATE));
    pb.set_message(title.to_string());
    pb
}

/// Render `bytes` the way the summaries print sizes ("12.34 MiB").
pub fn human_size(bytes: u64) -> String {
    indicatif::BinaryBytes(bytes).to_string()
}
