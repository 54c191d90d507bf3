use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use super::archive::InstallerArchive;
use super::profile::path_string;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::MavenCoordinate;

/// Turns processor argument templates into concrete arguments.
///
/// After `{KEY}` substitution an argument is one of:
/// - a packed blob (`*.lzma`) or an absolute path into the installer jar,
///   which is extracted into the scratch directory;
/// - a `[maven:coordinate]`, which becomes a path under `libraries/`;
/// - anything else, passed through untouched.
pub struct ArgTemplate<'a, R> {
    data: &'a HashMap<String, String>,
    installer: &'a mut InstallerArchive<R>,
    scratch_dir: &'a Path,
    launcher_dir: &'a Path,
    minecraft_jar: String,
}

impl<'a, R: Read + Seek> ArgTemplate<'a, R> {
    pub fn new(
        data: &'a HashMap<String, String>,
        installer: &'a mut InstallerArchive<R>,
        scratch_dir: &'a Path,
        launcher_dir: &'a Path,
        minecraft_jar: &Path,
    ) -> Self {
        Self {
            data,
            installer,
            scratch_dir,
            launcher_dir,
            minecraft_jar: path_string(minecraft_jar),
        }
    }

    pub fn resolve(&mut self, template: &str) -> LauncherResult<String> {
        let arg = substitute(template, self.data)?;

        let entry = arg.trim_start_matches('/');
        let in_installer = arg.starts_with('/')
            && arg != self.minecraft_jar
            && self.installer.contains(entry);
        if arg.ends_with(".lzma") || in_installer {
            let extracted = self.installer.extract(entry, self.scratch_dir)?;
            return Ok(path_string(&extracted));
        }

        let Some(coordinate) = arg.strip_prefix('[').and_then(|a| a.strip_suffix(']')) else {
            return Ok(arg);
        };
        let library = MavenCoordinate::parse(coordinate)?.to_file(self.launcher_dir.join("libraries"));
        Ok(path_string(&library))
    }
}

/// Replace every `{KEY}` in `template` with `data[KEY]`.
///
/// An unterminated `{` is kept literally.
pub fn substitute(template: &str, data: &HashMap<String, String>) -> LauncherResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        let key = &rest[open + 1..close];
        let value = data.get(key).ok_or_else(|| LauncherError::MissingVariable {
            key: key.to_string(),
            template: template.to_string(),
        })?;
        out.push_str(&rest[..open]);
        out.push_str(value);
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
