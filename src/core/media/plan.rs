use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use tracing::debug;

use super::manifest::{Manifest, Media, MediaKind};
use super::url::media_url;
use crate::core::config::Side;
use crate::core::downloader::{DownloadWarning, Fetch};
use crate::core::error::{LauncherError, LauncherResult};

/// One media file that will be installed on this side.
#[derive(Debug, Clone)]
pub struct PlannedMedia {
    pub kind: MediaKind,
    pub slug: String,
    /// Percent-decoded file name.
    pub file_name: String,
    pub url: String,
    pub dest: PathBuf,
    /// Probed size in bytes, 0 until probed or when the probe failed.
    pub size: u64,
}

impl PlannedMedia {
    fn new(kind: MediaKind, media: &Media, install_dir: &Path) -> LauncherResult<Self> {
        let file_name = decode_file_name(&media.name)?;
        Ok(Self {
            kind,
            slug: media.slug.clone(),
            dest: install_dir.join(kind.folder()).join(&file_name),
            url: media_url(media)?,
            file_name,
            size: 0,
        })
    }

    /// Ask the host for the file size. A failed probe leaves the size at 0;
    /// the entry is still attempted at download time.
    pub async fn probe<F: Fetch + ?Sized>(&mut self, fetcher: &F) -> Result<u64, DownloadWarning> {
        match fetcher.probe_size(&self.url).await {
            Ok(size) => {
                debug!("{} is {} bytes", self.url, size);
                self.size = size;
                Ok(size)
            }
            Err(warning) => {
                debug!("Size probe failed for {}: {}", self.file_name, warning);
                Err(warning)
            }
        }
    }

    pub fn is_installed(&self) -> bool {
        self.dest.is_file()
    }
}

/// The side-filtered set of media files to install, in manifest order.
#[derive(Debug, Clone)]
pub struct MediaPlan {
    pub install_dir: PathBuf,
    pub side: Side,
    pub items: Vec<PlannedMedia>,
    /// Media folders to create: one per non-empty list in the manifest,
    /// whatever the side.
    pub folders: Vec<PathBuf>,
}

impl MediaPlan {
    pub fn new(manifest: &Manifest, install_dir: &Path, side: Side) -> LauncherResult<Self> {
        let items = manifest
            .all_media()
            .filter(|(_, media)| media.wanted_on(side))
            .map(|(kind, media)| PlannedMedia::new(kind, media, install_dir))
            .collect::<LauncherResult<Vec<_>>>()?;

        let folders = MediaKind::ALL
            .into_iter()
            .filter(|kind| !manifest.media(*kind).is_empty())
            .map(|kind| install_dir.join(kind.folder()))
            .collect();

        Ok(Self {
            install_dir: install_dir.to_path_buf(),
            side,
            items,
            folders,
        })
    }

    /// The planned items of one kind, in manifest order.
    pub fn items_of_mut(&mut self, kind: MediaKind) -> impl Iterator<Item = &mut PlannedMedia> {
        self.items.iter_mut().filter(move |item| item.kind == kind)
    }

    pub fn total_size(&self) -> u64 {
        self.items.iter().map(|item| item.size).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Decode `%xx` escapes and refuse anything that is not a plain file name.
fn decode_file_name(name: &str) -> LauncherResult<String> {
    let decoded = percent_decode_str(name).decode_utf8_lossy().into_owned();
    if decoded.is_empty()
        || decoded == "."
        || decoded == ".."
        || decoded.contains(['/', '\\'])
    {
        return Err(LauncherError::Manifest(format!(
            "'{}' is not a valid file name",
            name
        )));
    }
    Ok(decoded)
}
