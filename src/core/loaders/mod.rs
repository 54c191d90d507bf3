pub mod forge;

use tracing::warn;

use crate::core::config::InstallOptions;
use crate::core::downloader::Fetch;
use crate::core::error::LauncherResult;
use forge::{ForgeInstaller, InstallSession};

/// Modloaders named in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderType {
    Forge,
    /// Recognised by name only; nothing installs these yet.
    Unsupported(String),
}

impl LoaderType {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "forge" => LoaderType::Forge,
            _ => LoaderType::Unsupported(name.to_string()),
        }
    }
}

/// Whether [`install_modloader`] did anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderInstallResult {
    Installed,
    Unsupported,
}

/// Install `loader` at `loader_version` for `minecraft_version`.
pub async fn install_modloader<F: Fetch + ?Sized>(
    options: &InstallOptions,
    minecraft_version: &str,
    loader: &str,
    loader_version: &str,
    client: &reqwest::Client,
    fetcher: &F,
) -> LauncherResult<LoaderInstallResult> {
    match LoaderType::from_name(loader) {
        LoaderType::Forge => {
            let session = InstallSession::new(options, minecraft_version, loader_version);
            ForgeInstaller::new(client, fetcher).install(&session).await?;
            Ok(LoaderInstallResult::Installed)
        }
        LoaderType::Unsupported(name) => {
            warn!("No installer for modloader {}", name);
            Ok(LoaderInstallResult::Unsupported)
        }
    }
}
