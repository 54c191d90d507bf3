use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{LauncherError, LauncherResult};

const DEFAULT_EXTENSION: &str = "jar";

/// A parsed Maven coordinate together with its repository layout.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version[:classifier]@extension`
///
/// Only the first three colons are structural. Anything after the third one
/// belongs to the classifier and ends up in the file name with its colons
/// turned into dashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension. Defaults to `"jar"`.
    pub extension: String,
    /// `/`-separated folder with a trailing `/`.
    folder: String,
    file: String,
}

impl MavenCoordinate {
    /// Parse a Maven coordinate string.
    ///
    /// # Examples
    /// ```
    /// use mcm_lib::core::maven::MavenCoordinate;
    ///
    /// let c = MavenCoordinate::parse("de.oceanlabs.mcp:mcp_config:1.20.1-20230612.114412@zip").unwrap();
    /// assert_eq!(c.relative_folder(), "de/oceanlabs/mcp/mcp_config/1.20.1-20230612.114412/");
    /// assert_eq!(c.file_name(), "mcp_config-1.20.1-20230612.114412.zip");
    /// ```
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let (body, extension) = coord
            .split_once('@')
            .unwrap_or((coord, DEFAULT_EXTENSION));

        if body.matches(':').count() < 2 {
            return Err(LauncherError::InvalidMavenCoordinate(coord.to_string()));
        }
        let Some((group_id, after_group)) = body.split_once(':') else {
            return Err(LauncherError::InvalidMavenCoordinate(coord.to_string()));
        };

        // Colons become separators up to the third one; dots only inside the group.
        let mut folder = String::with_capacity(body.len() + 1);
        let mut colons = 0;
        for ch in body.chars() {
            if colons == 3 {
                break;
            }
            match ch {
                ':' => {
                    colons += 1;
                    folder.push('/');
                }
                '.' if colons == 0 => folder.push('/'),
                other => folder.push(other),
            }
        }
        if !folder.ends_with('/') {
            folder.push('/');
        }

        let file = format!("{}.{}", after_group.replace(':', "-"), extension);

        let mut rest = after_group.splitn(3, ':');
        let artifact_id = rest.next().unwrap_or_default().to_string();
        let version = rest.next().unwrap_or_default().to_string();
        let classifier = rest.next().map(str::to_string);

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id,
            version,
            classifier,
            extension: extension.to_string(),
            folder,
            file,
        })
    }

    /// Folder relative to a repository root, `/`-separated with a trailing `/`.
    pub fn relative_folder(&self) -> &str {
        &self.folder
    }

    /// `artifactId-version[-classifier].extension`
    pub fn file_name(&self) -> &str {
        &self.file
    }

    /// Path relative to the libraries directory, using host separators.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .folder
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        path.push(&self.file);
        path
    }

    /// Join `base` with the artifact's folder and file name.
    pub fn to_file(&self, base: impl AsRef<Path>) -> PathBuf {
        base.as_ref().join(self.relative_path())
    }

    /// Full URL of the artifact under the given repository base.
    ///
    /// Always uses `/`, whatever the host's path convention.
    pub fn to_url(&self, base: &str) -> String {
        let mut url = String::with_capacity(base.len() + self.folder.len() + self.file.len() + 1);
        url.push_str(base);
        if !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(&self.folder);
        url.push_str(&self.file);
        url
    }
}

impl FromStr for MavenCoordinate {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{}", c)?;
        }
        if self.extension != DEFAULT_EXTENSION {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}
