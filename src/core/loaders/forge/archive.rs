use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use zip::ZipArchive;

use crate::core::error::{LauncherError, LauncherResult};

/// Read access to a Forge installer jar.
pub struct InstallerArchive<R = File> {
    archive: ZipArchive<R>,
}

impl InstallerArchive<File> {
    pub fn open(path: &Path) -> LauncherResult<Self> {
        let file = File::open(path).map_err(|e| LauncherError::io(path, e))?;
        Self::new(file)
    }
}

impl<R: Read + Seek> InstallerArchive<R> {
    pub fn new(reader: R) -> LauncherResult<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Deserialize a JSON entry such as `install_profile.json`.
    pub fn read_json<T: DeserializeOwned>(&mut self, name: &str) -> LauncherResult<T> {
        let entry = self
            .archive
            .by_name(name)
            .map_err(|e| LauncherError::Loader(format!("Missing {} in installer: {}", name, e)))?;
        Ok(serde_json::from_reader(entry)?)
    }

    pub fn read_string(&mut self, name: &str) -> LauncherResult<String> {
        let mut entry = self
            .archive
            .by_name(name)
            .map_err(|e| LauncherError::Loader(format!("Missing {} in installer: {}", name, e)))?;
        let mut text = String::new();
        entry.read_to_string(&mut text)?;
        Ok(text)
    }

    /// Extract `name` below `dest_dir`, keeping its archive path.
    pub fn extract(&mut self, name: &str, dest_dir: &Path) -> LauncherResult<PathBuf> {
        let mut entry = self
            .archive
            .by_name(name)
            .map_err(|e| LauncherError::Loader(format!("Missing {} in installer: {}", name, e)))?;

        let relative = entry.enclosed_name().ok_or_else(|| {
            LauncherError::Loader(format!("Refusing to extract unsafe path {}", name))
        })?;
        let target = dest_dir.join(relative);

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| LauncherError::io(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| LauncherError::io(&target, e))?;
        Ok(target)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build an in-memory zip from `(name, contents)` pairs.
    pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::fixtures::zip_bytes;
    use super::*;

    #[test]
    fn reads_json_and_extracts_nested_entries() {
        let bytes = zip_bytes(&[
            ("version.json", r#"{"id":"1.20.1-forge-47.1.0"}"#),
            ("data/client.lzma", "patches"),
        ]);
        let mut archive = InstallerArchive::new(Cursor::new(bytes)).unwrap();

        let json: serde_json::Value = archive.read_json("version.json").unwrap();
        assert_eq!(json["id"], "1.20.1-forge-47.1.0");

        assert!(archive.contains("data/client.lzma"));
        assert!(!archive.contains("data/server.lzma"));

        let dir = tempfile::tempdir().unwrap();
        let path = archive.extract("data/client.lzma", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("data").join("client.lzma"));
        assert_eq!(std::fs::read(path).unwrap(), b"patches");
    }

    #[test]
    fn missing_entry_is_a_loader_error() {
        let bytes = zip_bytes(&[("version.json", "{}")]);
        let mut archive = InstallerArchive::new(Cursor::new(bytes)).unwrap();
        let err = archive
            .read_json::<serde_json::Value>("install_profile.json")
            .unwrap_err();
        assert!(matches!(err, LauncherError::Loader(_)));
    }
}
