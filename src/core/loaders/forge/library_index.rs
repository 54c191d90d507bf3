use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indicatif::ProgressBar;
use tracing::{debug, info};

use super::archive::InstallerArchive;
use crate::core::downloader::Fetch;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{current_platform, LibraryEntry, LibraryRule};

/// A library's download artifact with its final rule folded in.
#[derive(Debug, Clone)]
pub struct ResolvedLibrary {
    pub name: String,
    /// `/`-separated path below `libraries/`.
    pub path: String,
    pub sha1: Option<String>,
    pub size: u64,
    /// Empty when the file ships inside the installer.
    pub url: String,
    pub rule: Option<LibraryRule>,
}

impl ResolvedLibrary {
    fn from_entry(entry: &LibraryEntry) -> Option<Self> {
        let artifact = entry.artifact()?;
        Some(Self {
            name: entry.name.clone(),
            path: artifact.path.clone(),
            sha1: artifact.sha1.clone(),
            size: artifact.size,
            url: artifact.url.clone(),
            rule: entry.last_rule().cloned(),
        })
    }

    pub fn is_bundled(&self) -> bool {
        self.url.is_empty()
    }

    pub fn is_wanted_on(&self, platform: &str) -> bool {
        self.rule.as_ref().map_or(true, |rule| rule.permits(platform))
    }

    /// Location under `launcher_dir/libraries`, with host separators.
    pub fn file_in(&self, launcher_dir: &Path) -> PathBuf {
        let mut path = launcher_dir.join("libraries");
        path.extend(self.path.split('/').filter(|s| !s.is_empty()));
        path
    }
}

/// Every library one Forge install needs, keyed by name.
#[derive(Debug, Default)]
pub struct LibraryIndex {
    libraries: IndexMap<String, ResolvedLibrary>,
}

impl LibraryIndex {
    /// Merge the three library lists in order: install profile, Forge
    /// version JSON, vanilla version JSON.
    ///
    /// A later entry with the same name replaces the earlier one outright but
    /// keeps its position. Entries without a download artifact are skipped.
    pub fn build(
        profile_libraries: &[LibraryEntry],
        version_libraries: &[LibraryEntry],
        minecraft_libraries: &[LibraryEntry],
    ) -> Self {
        let mut libraries = IndexMap::new();
        for entry in profile_libraries
            .iter()
            .chain(version_libraries)
            .chain(minecraft_libraries)
        {
            match ResolvedLibrary::from_entry(entry) {
                Some(library) => {
                    libraries.insert(library.name.clone(), library);
                }
                None => debug!("Library {} has no artifact download, ignoring", entry.name),
            }
        }
        Self { libraries }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedLibrary> {
        self.libraries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedLibrary> {
        self.libraries.values()
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Sum of the declared sizes, used as the progress total.
    pub fn total_size(&self) -> u64 {
        self.iter().map(|l| l.size).sum()
    }

    /// On-disk location of the library called `name`.
    pub fn file_for(&self, name: &str, launcher_dir: &Path) -> LauncherResult<PathBuf> {
        self.get(name)
            .map(|library| library.file_in(launcher_dir))
            .ok_or_else(|| LauncherError::Loader(format!("Library {} is not declared", name)))
    }

    /// Put every library wanted on this platform into `launcher_dir/libraries`.
    ///
    /// Bundled libraries come out of the installer's `maven/` folder, the
    /// rest are downloaded unless already present. No checksums are verified.
    pub async fn resolve_and_fetch<F, R>(
        &self,
        launcher_dir: &Path,
        installer: &mut InstallerArchive<R>,
        scratch_dir: &Path,
        fetcher: &F,
        progress: &ProgressBar,
    ) -> LauncherResult<()>
    where
        F: Fetch + ?Sized,
        R: Read + Seek,
    {
        let platform = current_platform();
        let mut fetched = 0_usize;

        for library in self.iter() {
            if !library.is_wanted_on(platform) {
                debug!("Skipping library (OS rule): {}", library.name);
                progress.inc(library.size);
                continue;
            }

            let dest = library.file_in(launcher_dir);

            if library.is_bundled() {
                if !dest.exists() {
                    let entry = format!("maven/{}", library.path);
                    let extracted = installer.extract(&entry, scratch_dir)?;
                    move_into_place(&extracted, &dest)?;
                    debug!("Extracted bundled library {}", library.name);
                }
                progress.inc(library.size);
                continue;
            }

            if dest.exists() {
                progress.inc(library.size);
                continue;
            }

            fetcher
                .fetch(&library.url, &dest, progress)
                .await
                .map_err(|warning| LauncherError::LibraryDownload {
                    name: library.name.clone(),
                    reason: warning.to_string(),
                })?;
            fetched += 1;
        }

        info!("Libraries ready ({} downloaded, {} total)", fetched, self.len());
        Ok(())
    }
}

/// Rename `from` to `to`, copying when they live on different filesystems.
fn move_into_place(from: &Path, to: &Path) -> LauncherResult<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }
    if std::fs::rename(from, to).is_err() {
        std::fs::copy(from, to).map_err(|e| LauncherError::io(to, e))?;
        let _ = std::fs::remove_file(from);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::super::archive::fixtures::zip_bytes;
    use super::*;
    use crate::core::downloader::fake::FakeFetch;

    fn entry(name: &str, path: &str, url: &str, size: u64) -> LibraryEntry {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "downloads": { "artifact": { "path": path, "sha1": "0", "size": size, "url": url } }
        }))
        .unwrap()
    }

    fn installer(entries: &[(&str, &str)]) -> InstallerArchive<Cursor<Vec<u8>>> {
        InstallerArchive::new(Cursor::new(zip_bytes(entries))).unwrap()
    }

    fn hidden_bar() -> ProgressBar {
        ProgressBar::hidden()
    }

    #[test]
    fn later_lists_replace_earlier_entries_in_place() {
        let profile = vec![
            entry("a:first:1", "a/first/1/first-1.jar", "https://profile/first", 1),
            entry("a:shared:1", "a/shared/1/shared-1.jar", "https://profile/shared", 1),
        ];
        let version = vec![entry(
            "a:shared:1",
            "a/shared/1/shared-1.jar",
            "https://version/shared",
            2,
        )];
        let minecraft = vec![entry("b:vanilla:1", "b/vanilla/1/vanilla-1.jar", "https://mc/v", 3)];

        let index = LibraryIndex::build(&profile, &version, &minecraft);

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("a:shared:1").unwrap().url, "https://version/shared");
        let order: Vec<&str> = index.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(order, ["a:first:1", "a:shared:1", "b:vanilla:1"]);
        assert_eq!(index.total_size(), 1 + 2 + 3);
    }

    #[test]
    fn entries_without_artifact_are_ignored() {
        let bare: LibraryEntry =
            serde_json::from_value(serde_json::json!({ "name": "org.lwjgl:lwjgl-platform:2.9.4" }))
                .unwrap();
        let index = LibraryIndex::build(&[bare], &[], &[]);
        assert!(index.is_empty());
    }

    #[test]
    fn library_file_uses_host_separators() {
        let index = LibraryIndex::build(
            &[entry("a:b:1", "a/b/1/b-1.jar", "https://x/b-1.jar", 1)],
            &[],
            &[],
        );
        let file = index.file_for("a:b:1", Path::new("mc")).unwrap();
        assert_eq!(
            file,
            Path::new("mc").join("libraries").join("a").join("b").join("1").join("b-1.jar")
        );
        assert!(index.file_for("missing:lib:1", Path::new("mc")).is_err());
    }

    #[tokio::test]
    async fn downloads_missing_and_skips_present() {
        let launcher = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let index = LibraryIndex::build(
            &[
                entry("a:new:1", "a/new/1/new-1.jar", "https://repo/new-1.jar", 5),
                entry("a:old:1", "a/old/1/old-1.jar", "https://repo/old-1.jar", 7),
            ],
            &[],
            &[],
        );
        let present = index.file_for("a:old:1", launcher.path()).unwrap();
        std::fs::create_dir_all(present.parent().unwrap()).unwrap();
        std::fs::write(&present, b"already").unwrap();

        let fetcher = FakeFetch::new(&[("https://repo/new-1.jar", "fresh")]);
        let progress = hidden_bar();
        let mut archive = installer(&[]);

        index
            .resolve_and_fetch(launcher.path(), &mut archive, scratch.path(), &fetcher, &progress)
            .await
            .unwrap();

        assert_eq!(fetcher.requests(), ["https://repo/new-1.jar"]);
        let fresh = index.file_for("a:new:1", launcher.path()).unwrap();
        assert_eq!(std::fs::read(fresh).unwrap(), b"fresh");
        assert_eq!(std::fs::read(present).unwrap(), b"already");
        assert_eq!(progress.position(), 5 + 7);
    }

    #[tokio::test]
    async fn bundled_libraries_come_from_the_installer() {
        let launcher = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let index = LibraryIndex::build(
            &[entry(
                "net.minecraftforge:forge:1.20.1-47.1.0:universal",
                "net/minecraftforge/forge/1.20.1-47.1.0/forge-1.20.1-47.1.0-universal.jar",
                "",
                4,
            )],
            &[],
            &[],
        );
        let mut archive = installer(&[(
            "maven/net/minecraftforge/forge/1.20.1-47.1.0/forge-1.20.1-47.1.0-universal.jar",
            "forge",
        )]);
        let fetcher = FakeFetch::new(&[]);

        index
            .resolve_and_fetch(launcher.path(), &mut archive, scratch.path(), &fetcher, &hidden_bar())
            .await
            .unwrap();

        let dest = index
            .file_for("net.minecraftforge:forge:1.20.1-47.1.0:universal", launcher.path())
            .unwrap();
        assert_eq!(std::fs::read(dest).unwrap(), b"forge");
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn libraries_for_other_platforms_are_skipped() {
        let launcher = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let foreign: LibraryEntry = serde_json::from_value(serde_json::json!({
            "name": "org.lwjgl:lwjgl:3.3.1:natives-beos",
            "downloads": { "artifact": {
                "path": "org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1-natives-beos.jar",
                "sha1": "0", "size": 9, "url": "https://repo/natives-beos.jar"
            } },
            "rules": [ { "action": "allow", "os": { "name": "beos" } } ]
        }))
        .unwrap();
        let index = LibraryIndex::build(&[], &[], &[foreign]);
        let fetcher = FakeFetch::new(&[]);
        let progress = hidden_bar();

        index
            .resolve_and_fetch(launcher.path(), &mut installer(&[]), scratch.path(), &fetcher, &progress)
            .await
            .unwrap();

        assert!(fetcher.requests().is_empty());
        assert_eq!(progress.position(), 9);
    }

    #[tokio::test]
    async fn failed_library_download_is_fatal() {
        let launcher = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let index = LibraryIndex::build(
            &[entry("a:gone:1", "a/gone/1/gone-1.jar", "https://repo/gone-1.jar", 1)],
            &[],
            &[],
        );
        let fetcher = FakeFetch::new(&[]);

        let err = index
            .resolve_and_fetch(launcher.path(), &mut installer(&[]), scratch.path(), &fetcher, &hidden_bar())
            .await
            .unwrap_err();
        match err {
            LauncherError::LibraryDownload { name, reason } => {
                assert_eq!(name, "a:gone:1");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
