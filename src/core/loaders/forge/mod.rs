// ─── Forge ───
// Emulates the official Forge installer: libraries from the install profile
// and version JSONs, then the profile's processors in order.

mod archive;
mod arg_template;
mod library_index;
mod processor;
mod profile;
mod scratch;
mod session;

pub use archive::InstallerArchive;
pub use arg_template::{substitute, ArgTemplate};
pub use library_index::{LibraryIndex, ResolvedLibrary};
pub use processor::{merge_class_files, ProcessorOutcome, ProcessorPipeline};
pub use profile::{FixedVariables, InstallProfile, Processor, SidedValue};
pub use scratch::ScratchDir;
pub use session::{read_installer, InstallSession, InstallerContents};

use tracing::info;

use crate::core::downloader::Fetch;
use crate::core::error::LauncherResult;
use crate::core::java::check_java_for_minecraft;
use crate::core::version::fetch_minecraft_json;

/// Runs every phase of an [`InstallSession`] in order.
pub struct ForgeInstaller<'a, F: ?Sized> {
    client: &'a reqwest::Client,
    fetcher: &'a F,
}

impl<'a, F: Fetch + ?Sized> ForgeInstaller<'a, F> {
    pub fn new(client: &'a reqwest::Client, fetcher: &'a F) -> Self {
        Self { client, fetcher }
    }

    /// Files already placed in the launcher directory stay there when a later
    /// phase fails; only the scratch directory is cleaned up.
    pub async fn install(&self, session: &InstallSession) -> LauncherResult<()> {
        info!(
            "Installing Forge {} for MC {} ({})",
            session.forge_version, session.minecraft_version, session.side
        );

        let java = session.check_preconditions().await?;
        let (minecraft, minecraft_raw) =
            fetch_minecraft_json(self.client, &session.minecraft_version).await?;
        check_java_for_minecraft(
            &java,
            &session.minecraft_version,
            minecraft.required_java_major(),
        );

        let scratch = session.prepare_scratch()?;
        session
            .download_inputs(self.fetcher, &minecraft, &minecraft_raw)
            .await?;

        let InstallerContents {
            mut archive,
            profile,
            version,
            version_raw,
        } = session.read_installer()?;
        session.write_version_files(&version_raw)?;
        session.inject_launcher_profile(&profile, &version)?;

        let libraries = session.library_index(&profile, &version, &minecraft);
        session
            .install_libraries(&libraries, &mut archive, &scratch, self.fetcher)
            .await?;
        session
            .run_processors(&profile, &libraries, &mut archive, &scratch)
            .await?;

        info!("Forge {} installed successfully", session.forge_version_id());
        Ok(())
    }
}
