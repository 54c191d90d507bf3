// ─── Version Manifest ───
// Handles fetching and parsing the Mojang version manifest v2.

use serde::Deserialize;
use tracing::info;

use super::version_file::VersionJson;
use crate::core::error::{LauncherError, LauncherResult};

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// Top-level Mojang version manifest.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl VersionManifest {
    /// Fetch the version manifest from Mojang using a shared HTTP client.
    pub async fn fetch(client: &reqwest::Client) -> LauncherResult<Self> {
        info!("Fetching Minecraft version manifest...");

        let manifest: VersionManifest = client
            .get(VERSION_MANIFEST_URL)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Find a specific version entry by ID (e.g. "1.20.1").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }
}

/// Resolve `minecraft_version` through the manifest and fetch its version JSON.
///
/// Returns the typed view together with the untouched JSON, which is what
/// gets written to the launcher's `versions/` directory.
pub async fn fetch_minecraft_json(
    client: &reqwest::Client,
    minecraft_version: &str,
) -> LauncherResult<(VersionJson, serde_json::Value)> {
    let manifest = VersionManifest::fetch(client).await?;
    let entry = manifest.find_version(minecraft_version).ok_or_else(|| {
        LauncherError::Loader(format!(
            "Couldn't find minecraft version {} in version manifest",
            minecraft_version
        ))
    })?;

    let raw: serde_json::Value = client
        .get(&entry.url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let parsed: VersionJson = serde_json::from_value(raw.clone())?;
    Ok((parsed, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_manifest_and_find_version() {
        let json = r#"{
            "latest": { "release": "1.20.1", "snapshot": "23w31a" },
            "versions": [
                {
                    "id": "23w31a",
                    "type": "snapshot",
                    "url": "https://example.com/23w31a.json",
                    "releaseTime": "2023-08-01T10:03:26+00:00"
                },
                {
                    "id": "1.20.1",
                    "type": "release",
                    "url": "https://example.com/1.20.1.json",
                    "sha1": "abc123"
                }
            ]
        }"#;
        let manifest: VersionManifest = serde_json::from_str(json).unwrap();
        let entry = manifest.find_version("1.20.1").unwrap();
        assert_eq!(entry.version_type, "release");
        assert_eq!(entry.url, "https://example.com/1.20.1.json");
        assert!(manifest.find_version("1.99").is_none());
    }
}
