pub mod manifest;
pub mod version_file;

pub use manifest::{fetch_minecraft_json, VersionEntry, VersionManifest};
pub use version_file::{
    current_platform, platform_for_os_name, DownloadArtifact, LibDownloadArtifact,
    LibraryDownloads, LibraryEntry, LibraryRule, OsRule, RuleAction, VersionDownloads,
    VersionJson,
};
