// ─── Install Configuration ───
// The options one install run is driven by, plus platform defaults.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which half of the game an install targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Client,
    Server,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Client => "client",
            Side::Server => "server",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both sides, the default for media and processors that don't say.
pub fn both_sides() -> Vec<Side> {
    vec![Side::Client, Side::Server]
}

/// Everything an install run needs to know up front.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub manifest: PathBuf,
    pub install_dir: PathBuf,
    pub side: Side,
    pub install_modloader: bool,
    /// Launcher directory. Equal to `install_dir` for servers.
    pub launcher_dir: PathBuf,
    /// Skip the confirmation prompt.
    pub confirm: bool,
    pub java: PathBuf,
}

impl InstallOptions {
    pub fn new(
        manifest: PathBuf,
        install_dir: PathBuf,
        side: Side,
        launcher_dir: Option<PathBuf>,
    ) -> Self {
        let launcher_dir = match side {
            Side::Server => install_dir.clone(),
            Side::Client => launcher_dir.unwrap_or_else(default_launcher_dir),
        };
        Self {
            manifest,
            install_dir,
            side,
            install_modloader: true,
            launcher_dir,
            confirm: false,
            java: PathBuf::from(DEFAULT_JAVA),
        }
    }
}

pub const DEFAULT_MANIFEST: &str = "manifest.json";
pub const DEFAULT_INSTALL_DIR: &str = "gamedir";
pub const DEFAULT_JAVA: &str = "java";

/// The vanilla launcher's data directory on this platform.
pub fn default_launcher_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minecraft")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    }
}
