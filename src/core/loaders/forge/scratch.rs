use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Working directory of one install run, removed again when dropped.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create `path` empty, wiping whatever an earlier run left there.
    pub fn create(path: impl Into<PathBuf>) -> LauncherResult<Self> {
        let path = path.into();
        if path.exists() {
            debug!("Clearing stale scratch dir {:?}", path);
            std::fs::remove_dir_all(&path).map_err(|e| LauncherError::io(&path, e))?;
        }
        std::fs::create_dir_all(&path).map_err(|e| LauncherError::io(&path, e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(source) = std::fs::remove_dir_all(&self.path) {
            if source.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove scratch dir {:?}: {}", self.path, source);
            }
        }
    }
}
