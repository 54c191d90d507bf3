// ─── Modpack Manifest ───
// The user-supplied description of a modpack.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::core::config::{both_sides, Side};
use crate::core::error::{LauncherError, LauncherResult};

const MEDIA_TYPES: &[&str] = &["cf", "mr", "pm", "url"];

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub minecraft: MinecraftSection,
    #[serde(default)]
    pub mods: Vec<Media>,
    #[serde(default)]
    pub resourcepacks: Vec<Media>,
    #[serde(default)]
    pub shaderpacks: Vec<Media>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinecraftSection {
    pub version: String,
    /// `loader-version`, e.g. `forge-47.1.0`.
    pub modloader: String,
}

/// A mod, resourcepack or shaderpack.
#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    pub slug: String,
    /// File name, possibly percent-encoded.
    pub name: String,
    #[serde(default = "both_sides")]
    pub sides: Vec<Side>,
    #[serde(default)]
    pub info: Option<MediaInfo>,
    #[serde(flatten)]
    pub source: MediaSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

/// Where a media file is hosted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaSource {
    /// CurseForge, by numeric file id.
    Cf {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    },
    /// Modrinth, by project id followed by version id.
    Mr { id: String },
    /// Planet Minecraft, by media category.
    Pm { media: String },
    /// Any other URL.
    Url { url: String },
}

impl Media {
    pub fn is_external(&self) -> bool {
        matches!(self.source, MediaSource::Url { .. })
    }

    pub fn wanted_on(&self, side: Side) -> bool {
        self.sides.contains(&side)
    }
}

/// The three media lists, in install order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Mod,
    Resourcepack,
    Shaderpack,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Mod, MediaKind::Resourcepack, MediaKind::Shaderpack];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Mod => "mod",
            MediaKind::Resourcepack => "resourcepack",
            MediaKind::Shaderpack => "shaderpack",
        }
    }

    /// Folder below the install dir, e.g. `mods`.
    pub fn folder(self) -> String {
        format!("{}s", self.as_str())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Manifest {
    pub fn load(path: &Path) -> LauncherResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| LauncherError::io(path, e))?;
        let manifest = Self::from_json(&raw)?;
        debug!(
            "Loaded manifest {:?}: {} mods, {} resourcepacks, {} shaderpacks",
            path,
            manifest.mods.len(),
            manifest.resourcepacks.len(),
            manifest.shaderpacks.len()
        );
        Ok(manifest)
    }

    /// Validate and parse a manifest document.
    pub fn from_json(raw: &str) -> LauncherResult<Self> {
        let document: serde_json::Value = serde_json::from_str(raw)?;
        validate(&document)?;
        serde_json::from_value(document).map_err(|e| LauncherError::Manifest(e.to_string()))
    }

    /// `(loader, loader_version)`, split at the first `-`.
    pub fn modloader(&self) -> (&str, &str) {
        self.minecraft
            .modloader
            .split_once('-')
            .unwrap_or((self.minecraft.modloader.as_str(), ""))
    }

    pub fn media(&self, kind: MediaKind) -> &[Media] {
        match kind {
            MediaKind::Mod => &self.mods,
            MediaKind::Resourcepack => &self.resourcepacks,
            MediaKind::Shaderpack => &self.shaderpacks,
        }
    }

    /// Every media entry with its kind, mods first.
    pub fn all_media(&self) -> impl Iterator<Item = (MediaKind, &Media)> {
        MediaKind::ALL
            .into_iter()
            .flat_map(move |kind| self.media(kind).iter().map(move |m| (kind, m)))
    }

    /// Media downloaded from arbitrary URLs.
    pub fn external_media(&self) -> impl Iterator<Item = &Media> {
        self.all_media().map(|(_, m)| m).filter(|m| m.is_external())
    }
}

fn validate(document: &serde_json::Value) -> LauncherResult<()> {
    let minecraft = document
        .get("minecraft")
        .filter(|m| !m.is_null())
        .ok_or_else(|| LauncherError::Manifest("The modpack must include a 'minecraft' section.".into()))?;

    if minecraft.get("version").map_or(true, |v| v.is_null()) {
        return Err(LauncherError::Manifest(
            "The 'minecraft' section must include the minecraft version.".into(),
        ));
    }
    let modloader_ok = minecraft
        .get("modloader")
        .and_then(|m| m.as_str())
        .map_or(false, |m| m.contains('-'));
    if !modloader_ok {
        return Err(LauncherError::Manifest(
            "The 'minecraft' section must include the modloader and version in this format: \
             'modloader-x.x.x'"
                .into(),
        ));
    }

    for kind in MediaKind::ALL {
        let Some(list) = document.get(kind.folder()).and_then(|l| l.as_array()) else {
            continue;
        };
        for media in list {
            for key in ["type", "slug", "name"] {
                if media.get(key).is_none() {
                    return Err(LauncherError::Manifest(format!(
                        "The '{}' key should be specified in the following {}: {}.",
                        key, kind, media
                    )));
                }
            }
            let media_type = media.get("type").and_then(|t| t.as_str()).unwrap_or_default();
            if !MEDIA_TYPES.contains(&media_type) {
                return Err(LauncherError::Manifest(format!(
                    "The type '{}' does not exist: {}.",
                    media.get("type").map(ToString::to_string).unwrap_or_default(),
                    media
                )));
            }
        }
    }
    Ok(())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}
