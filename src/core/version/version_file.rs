// ─── Version File ───
// Parses Mojang/Forge version JSONs and evaluates OS rules for libraries.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::core::config::Side;
use crate::core::error::{LauncherError, LauncherResult};

/// Rule OS names paired with the `std::env::consts::OS` value they denote.
const OS_NAMES: &[(&str, &str)] = &[("windows", "windows"), ("linux", "linux"), ("osx", "macos")];

/// Translate a rule OS name ("osx") into the platform identifier ("macos").
pub fn platform_for_os_name(name: &str) -> Option<&'static str> {
    OS_NAMES
        .iter()
        .find(|(rule_name, _)| *rule_name == name)
        .map(|(_, platform)| *platform)
}

/// The platform identifier of the running process.
pub fn current_platform() -> &'static str {
    std::env::consts::OS
}

/// A parsed version JSON: either the vanilla one from Mojang or the
/// `version.json` bundled inside a Forge installer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    pub major_version: u32,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    pub client: Option<DownloadArtifact>,
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

impl VersionJson {
    /// URL of the game jar for `side`.
    pub fn jar_url(&self, side: Side) -> LauncherResult<&str> {
        let artifact = self.downloads.as_ref().and_then(|d| match side {
            Side::Client => d.client.as_ref(),
            Side::Server => d.server.as_ref(),
        });
        artifact.map(|a| a.url.as_str()).ok_or_else(|| {
            LauncherError::Loader(format!("Version {} has no {} jar download", self.id, side))
        })
    }

    pub fn required_java_major(&self) -> Option<u32> {
        self.java_version.as_ref().map(|j| j.major_version)
    }
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Vec<LibraryRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDownloads {
    pub artifact: Option<LibDownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibDownloadArtifact {
    pub path: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// Empty when the file ships inside the installer under `maven/<path>`.
    #[serde(default)]
    pub url: String,
}

impl LibraryEntry {
    pub fn artifact(&self) -> Option<&LibDownloadArtifact> {
        self.downloads.as_ref()?.artifact.as_ref()
    }

    /// Only the final rule of a library is honoured.
    pub fn last_rule(&self) -> Option<&LibraryRule> {
        self.rules.last()
    }
}

// ─── OS Rule Evaluation ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    #[serde(default)]
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub arch: Option<String>,
}

impl LibraryRule {
    /// Whether the rule's OS constraint names `platform`. A rule without one
    /// matches every platform, an OS name missing from the table none.
    pub fn matches_platform(&self, platform: &str) -> bool {
        match self.os.as_ref().and_then(|os| os.name.as_deref()) {
            None => true,
            Some(name) => platform_for_os_name(name) == Some(platform),
        }
    }

    pub fn permits(&self, platform: &str) -> bool {
        let matches = self.matches_platform(platform);
        match self.action {
            RuleAction::Allow => matches,
            RuleAction::Disallow => !matches,
        }
    }
}
