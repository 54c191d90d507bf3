// ─── Launcher Profiles ───
// Adds entries to the vanilla launcher's `launcher_profiles.json`.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

pub const LAUNCHER_PROFILES_FILE: &str = "launcher_profiles.json";

/// Sorts new profiles below the ones the user actually played.
const NEVER_USED: &str = "1970-01-02T00:00:00.000Z";

/// One entry of the `profiles` object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherProfile {
    pub game_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created: String,
    pub last_used: String,
    pub last_version_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub profile_type: String,
}

impl LauncherProfile {
    /// A custom profile starting `version_id` from `game_dir`.
    pub fn custom(name: String, version_id: String, game_dir: PathBuf, icon: Option<String>) -> Self {
        Self {
            game_dir,
            icon,
            created: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            last_used: NEVER_USED.to_string(),
            last_version_id: version_id,
            name,
            profile_type: "custom".to_string(),
        }
    }
}

/// Set `profiles[key]` in the launcher's profile file, leaving every other
/// key as it was. The file must already exist.
pub fn inject_profile(launcher_dir: &Path, key: &str, profile: &LauncherProfile) -> LauncherResult<()> {
    let path = launcher_dir.join(LAUNCHER_PROFILES_FILE);
    if !path.is_file() {
        return Err(LauncherError::LauncherNotInitialized(path));
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| LauncherError::io(&path, e))?;
    let mut document: serde_json::Value = serde_json::from_str(&raw)?;
    let root = document.as_object_mut().ok_or_else(|| {
        LauncherError::Other(format!("{} is not a JSON object", path.display()))
    })?;

    let profiles = root
        .entry("profiles")
        .or_insert_with(|| serde_json::Value::Object(Default::default()));
    if !profiles.is_object() {
        *profiles = serde_json::Value::Object(Default::default());
    }
    if let Some(profiles) = profiles.as_object_mut() {
        profiles.insert(key.to_string(), serde_json::to_value(profile)?);
    }

    let pretty = serde_json::to_string_pretty(&document)?;
    std::fs::write(&path, pretty).map_err(|e| LauncherError::io(&path, e))?;
    info!("Added launcher profile {}", key);
    Ok(())
}
