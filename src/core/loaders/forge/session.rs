use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::{debug, info};

use super::archive::InstallerArchive;
use super::arg_template::ArgTemplate;
use super::library_index::LibraryIndex;
use super::processor::ProcessorPipeline;
use super::profile::{FixedVariables, InstallProfile};
use super::scratch::ScratchDir;
use crate::core::config::{InstallOptions, Side};
use crate::core::downloader::Fetch;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::java::{ensure_java, JavaInstallation};
use crate::core::launcher::{inject_profile, LauncherProfile, LAUNCHER_PROFILES_FILE};
use crate::core::media::forge_installer_url;
use crate::core::progress;
use crate::core::version::VersionJson;

const SCRATCH_DIR_NAME: &str = ".temp";

/// The two descriptors a Forge installer carries.
pub struct InstallerContents<R = File> {
    pub archive: InstallerArchive<R>,
    pub profile: InstallProfile,
    pub version: VersionJson,
    /// `version.json` exactly as shipped.
    pub version_raw: String,
}

/// Everything one Forge install works with, resolved up front.
///
/// Construction only computes paths; each phase of the install is a separate
/// method so it can run (and be tested) on its own.
#[derive(Debug, Clone)]
pub struct InstallSession {
    pub minecraft_version: String,
    pub forge_version: String,
    pub side: Side,
    pub install_dir: PathBuf,
    pub launcher_dir: PathBuf,
    pub java: PathBuf,
    scratch_dir: PathBuf,
    installer: PathBuf,
    minecraft_jar: PathBuf,
}

impl InstallSession {
    pub fn new(options: &InstallOptions, minecraft_version: &str, forge_version: &str) -> Self {
        let launcher_dir = match options.side {
            Side::Server => options.install_dir.clone(),
            Side::Client => options.launcher_dir.clone(),
        };
        let scratch_dir = launcher_dir.join(SCRATCH_DIR_NAME);
        let installer = scratch_dir.join(format!(
            "forge-{}-{}-installer.jar",
            minecraft_version, forge_version
        ));
        let minecraft_jar = match options.side {
            Side::Client => launcher_dir
                .join("versions")
                .join(minecraft_version)
                .join(format!("{}.jar", minecraft_version)),
            Side::Server => scratch_dir.join(format!("{}.jar", minecraft_version)),
        };

        Self {
            minecraft_version: minecraft_version.to_string(),
            forge_version: forge_version.to_string(),
            side: options.side,
            install_dir: options.install_dir.clone(),
            launcher_dir,
            java: options.java.clone(),
            scratch_dir,
            installer,
            minecraft_jar,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn installer_path(&self) -> &Path {
        &self.installer
    }

    pub fn minecraft_jar(&self) -> &Path {
        &self.minecraft_jar
    }

    /// `1.20.1-forge-47.1.0`
    pub fn forge_version_id(&self) -> String {
        format!("{}-forge-{}", self.minecraft_version, self.forge_version)
    }

    /// Key of the injected launcher profile.
    pub fn profile_key(&self) -> String {
        format!("forge-{}", self.minecraft_version)
    }

    fn minecraft_json_path(&self) -> PathBuf {
        self.launcher_dir
            .join("versions")
            .join(&self.minecraft_version)
            .join(format!("{}.json", self.minecraft_version))
    }

    fn forge_json_path(&self) -> PathBuf {
        let id = self.forge_version_id();
        self.launcher_dir
            .join("versions")
            .join(&id)
            .join(format!("{}.json", id))
    }

    // ── Phases ──────────────────────────────────────────

    /// Java must run, and a client install needs a launcher that has been
    /// started at least once.
    pub async fn check_preconditions(&self) -> LauncherResult<JavaInstallation> {
        let java = ensure_java(&self.java).await?;
        debug!("Using Java {} ({}) at {:?}", java.version, java.vendor, java.path);

        let profiles = self.launcher_dir.join(LAUNCHER_PROFILES_FILE);
        if self.side == Side::Client && !profiles.is_file() {
            return Err(LauncherError::LauncherNotInitialized(profiles));
        }
        Ok(java)
    }

    pub fn prepare_scratch(&self) -> LauncherResult<ScratchDir> {
        ScratchDir::create(&self.scratch_dir)
    }

    /// Write the vanilla version JSON (client only), then fetch the Forge
    /// installer and the game jar.
    pub async fn download_inputs<F: Fetch + ?Sized>(
        &self,
        fetcher: &F,
        minecraft: &VersionJson,
        minecraft_raw: &serde_json::Value,
    ) -> LauncherResult<()> {
        if self.side == Side::Client {
            let path = self.minecraft_json_path();
            write_file(&path, serde_json::to_string_pretty(minecraft_raw)?)?;
        }

        let installer_url = forge_installer_url(&self.minecraft_version, &self.forge_version);
        let jar_url = minecraft.jar_url(self.side)?;
        let bar = ProgressBar::hidden();

        for (url, dest) in [(installer_url.as_str(), &self.installer), (jar_url, &self.minecraft_jar)] {
            info!("Downloading {}", url);
            fetcher.fetch(url, dest, &bar).await?;
        }
        Ok(())
    }

    pub fn read_installer(&self) -> LauncherResult<InstallerContents> {
        read_installer(InstallerArchive::open(&self.installer)?)
    }

    /// Write the Forge version JSON unless the launcher already has it.
    pub fn write_version_files(&self, version_raw: &str) -> LauncherResult<()> {
        if self.side != Side::Client {
            return Ok(());
        }
        let path = self.forge_json_path();
        if path.is_file() {
            debug!("{:?} already present", path);
            return Ok(());
        }
        write_file(&path, version_raw)
    }

    pub fn inject_launcher_profile(
        &self,
        profile: &InstallProfile,
        version: &VersionJson,
    ) -> LauncherResult<()> {
        if self.side != Side::Client {
            return Ok(());
        }
        let entry = LauncherProfile::custom(
            format!("forge {}", self.minecraft_version),
            version.id.clone(),
            self.install_dir.clone(),
            profile.icon.clone(),
        );
        inject_profile(&self.launcher_dir, &self.profile_key(), &entry)
    }

    pub fn library_index(
        &self,
        profile: &InstallProfile,
        version: &VersionJson,
        minecraft: &VersionJson,
    ) -> LibraryIndex {
        LibraryIndex::build(&profile.libraries, &version.libraries, &minecraft.libraries)
    }

    pub async fn install_libraries<F, R>(
        &self,
        libraries: &LibraryIndex,
        installer: &mut InstallerArchive<R>,
        scratch: &ScratchDir,
        fetcher: &F,
    ) -> LauncherResult<()>
    where
        F: Fetch + ?Sized,
        R: Read + Seek,
    {
        let bar = progress::bytes_bar(libraries.total_size(), "Downloading Forge:");
        let result = libraries
            .resolve_and_fetch(&self.launcher_dir, installer, scratch.path(), fetcher, &bar)
            .await;
        bar.finish_and_clear();
        result
    }

    pub async fn run_processors<R: Read + Seek>(
        &self,
        profile: &InstallProfile,
        libraries: &LibraryIndex,
        installer: &mut InstallerArchive<R>,
        scratch: &ScratchDir,
    ) -> LauncherResult<()> {
        let data = profile.data_context(&FixedVariables {
            installer: &self.installer,
            minecraft_jar: &self.minecraft_jar,
            root: &self.launcher_dir,
            side: self.side,
        });
        let mut args = ArgTemplate::new(
            &data,
            installer,
            scratch.path(),
            &self.launcher_dir,
            &self.minecraft_jar,
        );
        let pipeline = ProcessorPipeline::new(
            self.side,
            &self.java,
            libraries,
            &self.launcher_dir,
            scratch.path(),
        );

        let bar = progress::items_bar(profile.processors.len() as u64, "Installing Forge:");
        let result = pipeline.run(&profile.processors, &mut args, &bar).await;
        bar.finish_and_clear();
        result
    }
}

/// Pull `install_profile.json` and `version.json` out of an installer.
pub fn read_installer<R: Read + Seek>(
    mut archive: InstallerArchive<R>,
) -> LauncherResult<InstallerContents<R>> {
    let profile: InstallProfile = archive.read_json("install_profile.json")?;
    let version_raw = archive.read_string("version.json")?;
    let version: VersionJson = serde_json::from_str(&version_raw)?;
    Ok(InstallerContents {
        archive,
        profile,
        version,
        version_raw,
    })
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| LauncherError::io(path, e))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::super::archive::fixtures::zip_bytes;
    use super::*;
    use crate::core::downloader::fake::FakeFetch;

    const VERSION_JSON: &str = r#"{
  "id": "1.20.1-forge-47.1.0",
  "libraries": [
    {
      "name": "net.minecraftforge:fmlloader:1.20.1-47.1.0",
      "downloads": { "artifact": {
        "path": "net/minecraftforge/fmlloader/1.20.1-47.1.0/fmlloader-1.20.1-47.1.0.jar",
        "sha1": "0", "size": 3,
        "url": "https://maven.minecraftforge.net/net/minecraftforge/fmlloader/1.20.1-47.1.0/fmlloader-1.20.1-47.1.0.jar"
      } }
    }
  ]
}"#;

    const INSTALL_PROFILE: &str = r#"{
  "icon": "data:image/png;base64,AAAA",
  "data": { "BINPATCH": { "client": "/data/client.lzma", "server": "/data/server.lzma" } },
  "processors": [],
  "libraries": [
    {
      "name": "net.minecraftforge:forge:1.20.1-47.1.0",
      "downloads": { "artifact": {
        "path": "net/minecraftforge/forge/1.20.1-47.1.0/forge-1.20.1-47.1.0.jar",
        "sha1": "0", "size": 5, "url": ""
      } }
    }
  ]
}"#;

    fn options(root: &Path, side: Side) -> InstallOptions {
        let mut options = InstallOptions::new(
            root.join("manifest.json"),
            root.join("gamedir"),
            side,
            Some(root.join(".minecraft")),
        );
        options.java = PathBuf::from("java");
        options
    }

    fn installer_bytes() -> Vec<u8> {
        zip_bytes(&[
            ("install_profile.json", INSTALL_PROFILE),
            ("version.json", VERSION_JSON),
            (
                "maven/net/minecraftforge/forge/1.20.1-47.1.0/forge-1.20.1-47.1.0.jar",
                "forge",
            ),
        ])
    }

    #[test]
    fn client_paths() {
        let root = Path::new("/r");
        let session = InstallSession::new(&options(root, Side::Client), "1.20.1", "47.1.0");
        let mc = root.join(".minecraft");
        assert_eq!(session.launcher_dir, mc);
        assert_eq!(session.scratch_dir(), mc.join(".temp"));
        assert_eq!(
            session.installer_path(),
            mc.join(".temp").join("forge-1.20.1-47.1.0-installer.jar")
        );
        assert_eq!(
            session.minecraft_jar(),
            mc.join("versions").join("1.20.1").join("1.20.1.jar")
        );
        assert_eq!(session.forge_version_id(), "1.20.1-forge-47.1.0");
        assert_eq!(session.profile_key(), "forge-1.20.1");
    }

    #[test]
    fn server_paths_live_in_install_dir() {
        let root = Path::new("/r");
        let session = InstallSession::new(&options(root, Side::Server), "1.20.1", "47.1.0");
        let game = root.join("gamedir");
        assert_eq!(session.launcher_dir, game);
        assert_eq!(session.minecraft_jar(), game.join(".temp").join("1.20.1.jar"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn client_without_launcher_profiles_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let mut opts = options(root.path(), Side::Client);
        // `true` accepts any arguments and exits 0, standing in for java.
        opts.java = PathBuf::from("true");
        let session = InstallSession::new(&opts, "1.20.1", "47.1.0");

        let err = session.check_preconditions().await.unwrap_err();
        assert!(matches!(err, LauncherError::LauncherNotInitialized(_)));
    }

    #[test]
    fn reads_descriptors_from_installer() {
        let contents = read_installer(InstallerArchive::new(Cursor::new(installer_bytes())).unwrap()).unwrap();
        assert_eq!(contents.version.id, "1.20.1-forge-47.1.0");
        assert_eq!(contents.profile.libraries.len(), 1);
        assert_eq!(contents.version_raw, VERSION_JSON);
    }

    #[test]
    fn version_file_is_written_once() {
        let root = tempfile::tempdir().unwrap();
        let session = InstallSession::new(&options(root.path(), Side::Client), "1.20.1", "47.1.0");

        session.write_version_files(VERSION_JSON).unwrap();
        let path = session.forge_json_path();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), VERSION_JSON);

        session.write_version_files("{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), VERSION_JSON);
    }

    #[test]
    fn server_writes_no_launcher_files() {
        let root = tempfile::tempdir().unwrap();
        let session = InstallSession::new(&options(root.path(), Side::Server), "1.20.1", "47.1.0");
        let contents = read_installer(InstallerArchive::new(Cursor::new(installer_bytes())).unwrap()).unwrap();

        session.write_version_files(VERSION_JSON).unwrap();
        session
            .inject_launcher_profile(&contents.profile, &contents.version)
            .unwrap();
        assert!(!session.launcher_dir.join("versions").exists());
    }

    #[test]
    fn profile_is_injected_for_client() {
        let root = tempfile::tempdir().unwrap();
        let session = InstallSession::new(&options(root.path(), Side::Client), "1.20.1", "47.1.0");
        std::fs::create_dir_all(&session.launcher_dir).unwrap();
        std::fs::write(session.launcher_dir.join(LAUNCHER_PROFILES_FILE), r#"{"profiles":{}}"#).unwrap();
        let contents = read_installer(InstallerArchive::new(Cursor::new(installer_bytes())).unwrap()).unwrap();

        session
            .inject_launcher_profile(&contents.profile, &contents.version)
            .unwrap();

        let raw = std::fs::read_to_string(session.launcher_dir.join(LAUNCHER_PROFILES_FILE)).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &doc["profiles"]["forge-1.20.1"];
        assert_eq!(entry["lastVersionId"], "1.20.1-forge-47.1.0");
        assert_eq!(entry["icon"], "data:image/png;base64,AAAA");
        assert_eq!(entry["gameDir"], session.install_dir.to_string_lossy().into_owned());
    }

    #[tokio::test]
    async fn libraries_phase_extracts_and_downloads() {
        let root = tempfile::tempdir().unwrap();
        let session = InstallSession::new(&options(root.path(), Side::Client), "1.20.1", "47.1.0");
        let mut contents = read_installer(InstallerArchive::new(Cursor::new(installer_bytes())).unwrap()).unwrap();
        let minecraft: VersionJson =
            serde_json::from_value(serde_json::json!({ "id": "1.20.1", "libraries": [] })).unwrap();
        let libraries = session.library_index(&contents.profile, &contents.version, &minecraft);
        let scratch = session.prepare_scratch().unwrap();
        let fetcher = FakeFetch::new(&[(
            "https://maven.minecraftforge.net/net/minecraftforge/fmlloader/1.20.1-47.1.0/fmlloader-1.20.1-47.1.0.jar",
            "fml",
        )]);

        session
            .install_libraries(&libraries, &mut contents.archive, &scratch, &fetcher)
            .await
            .unwrap();

        let libs = session.launcher_dir.join("libraries");
        assert_eq!(
            std::fs::read(libs.join("net/minecraftforge/forge/1.20.1-47.1.0/forge-1.20.1-47.1.0.jar")).unwrap(),
            b"forge"
        );
        assert_eq!(
            std::fs::read(libs.join("net/minecraftforge/fmlloader/1.20.1-47.1.0/fmlloader-1.20.1-47.1.0.jar")).unwrap(),
            b"fml"
        );

        drop(scratch);
        assert!(!session.scratch_dir().exists());
    }

    #[tokio::test]
    async fn inputs_are_fetched_into_session_paths() {
        let root = tempfile::tempdir().unwrap();
        let session = InstallSession::new(&options(root.path(), Side::Client), "1.20.1", "47.1.0");
        let raw = serde_json::json!({
            "id": "1.20.1",
            "downloads": { "client": { "sha1": "a", "size": 3, "url": "https://piston-data.mojang.com/client.jar" } },
            "libraries": []
        });
        let minecraft: VersionJson = serde_json::from_value(raw.clone()).unwrap();
        let fetcher = FakeFetch::new(&[
            (forge_installer_url("1.20.1", "47.1.0").as_str(), "installer"),
            ("https://piston-data.mojang.com/client.jar", "jar"),
        ]);
        let _scratch = session.prepare_scratch().unwrap();

        session.download_inputs(&fetcher, &minecraft, &raw).await.unwrap();

        assert_eq!(std::fs::read(session.installer_path()).unwrap(), b"installer");
        assert_eq!(std::fs::read(session.minecraft_jar()).unwrap(), b"jar");
        let written = std::fs::read_to_string(session.minecraft_json_path()).unwrap();
        assert!(written.starts_with("{\n  \""));
    }
}
