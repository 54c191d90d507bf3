// ─── Modpack Media ───
// Manifest parsing, per-host download URLs and the side-filtered download
// of mods, resourcepacks and shaderpacks.

mod download;
mod manifest;
mod plan;
mod url;

pub use download::{download_files, DownloadReport};
pub use manifest::{Manifest, Media, MediaInfo, MediaKind, MediaSource, MinecraftSection};
pub use plan::{MediaPlan, PlannedMedia};
pub use url::{forge_installer_url, media_url};
