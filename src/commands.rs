// ─── Command Line ───
// `mcm install` takes everything from flags, `mcm cli` asks for it.
// Both end in the same install flow.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use inquire::{Confirm, InquireError, Select, Text};
use tracing::debug;

use crate::core::config::{
    default_launcher_dir, InstallOptions, Side, DEFAULT_INSTALL_DIR, DEFAULT_JAVA,
    DEFAULT_MANIFEST,
};
use crate::core::downloader::{DownloadWarning, Downloader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::loaders::{install_modloader, LoaderInstallResult};
use crate::core::media::{download_files, Manifest, MediaKind, MediaPlan, MediaSource};
use crate::core::progress::{bytes_bar, human_size};

#[derive(Debug, Parser)]
#[command(name = "mcm", version)]
#[command(about = "Minecraft modpack manager: installs modpacks and the Forge modloader")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install a modpack from command line options
    Install(InstallArgs),
    /// Answer a few questions, then install
    Cli(InteractiveArgs),
}

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Continue installation without confirmation
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Manifest file to load
    #[arg(short = 'm', value_name = "MANIFEST", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Path the modpack is installed to
    #[arg(short = 'i', value_name = "INSTPATH", default_value = DEFAULT_INSTALL_DIR)]
    pub install_dir: PathBuf,

    /// Side to install
    #[arg(short = 's', value_enum, value_name = "SIDE", default_value_t = Side::Client)]
    pub side: Side,

    /// Launcher directory (client only)
    #[arg(short = 'l', value_name = "LAUNCHERPATH")]
    pub launcher_dir: Option<PathBuf>,

    /// Skip the installation of the modloader
    #[arg(short = 'o')]
    pub skip_modloader: bool,

    /// Java binary used to run the Forge processors
    #[arg(long, env = "MCM_JAVA", default_value = DEFAULT_JAVA)]
    pub java: PathBuf,
}

#[derive(Debug, Args)]
pub struct InteractiveArgs {
    /// Java binary used to run the Forge processors
    #[arg(long, env = "MCM_JAVA", default_value = DEFAULT_JAVA)]
    pub java: PathBuf,
}

/// How a command ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    /// The user declined the confirmation.
    Cancelled,
    /// Ctrl+C at a prompt.
    Interrupted,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Exit::Success | Exit::Cancelled => 0,
            Exit::Interrupted => 130,
        }
    }
}

impl InstallArgs {
    pub fn into_options(self) -> LauncherResult<InstallOptions> {
        let mut options = InstallOptions::new(
            self.manifest,
            absolute(&self.install_dir)?,
            self.side,
            self.launcher_dir,
        );
        options.install_modloader = !self.skip_modloader;
        options.confirm = self.yes;
        options.java = self.java;
        Ok(options)
    }
}

pub async fn execute(cli: Cli) -> LauncherResult<Exit> {
    let options = match cli.command {
        Command::Install(args) => args.into_options()?,
        Command::Cli(args) => match ask_options(args)? {
            Some(options) => options,
            None => return Ok(interrupted()),
        },
    };
    debug!("Install options: {:?}", options);
    install(&options).await
}

// ── Install flow ────────────────────────────────────────

pub async fn install(options: &InstallOptions) -> LauncherResult<Exit> {
    let manifest = Manifest::load(&options.manifest)?;
    let (loader, loader_version) = manifest.modloader();

    println!("Modpack version: {}", manifest.minecraft.version);
    println!("Mod loader: {}", loader);
    println!("Mod loader version: {}", loader_version);

    let client = build_http_client()?;
    let downloader = Downloader::with_client(client.clone());

    let mut plan = MediaPlan::new(&manifest, &options.install_dir, options.side)?;
    for kind in MediaKind::ALL {
        if manifest.media(kind).is_empty() {
            continue;
        }
        println!("\n{}: ", capitalize(&kind.folder()));
        for item in plan.items_of_mut(kind) {
            let probed = item.probe(&downloader).await;
            if let Err(warning) = probed {
                print_warning(&item.file_name, &warning);
            }
            println!("  {} ({})", item.slug, item.file_name);
        }
    }

    let mut external = manifest.external_media().peekable();
    if external.peek().is_some() {
        println!(
            "\n{}",
            "WARNING! Some mods/resourcepacks/shaderpacks are from external sources and could harm your system:"
                .yellow()
                .bold()
        );
        for media in external {
            if let MediaSource::Url { url } = &media.source {
                println!("  {} ({}): {}", media.slug, media.name, url);
            }
        }
    }

    println!(
        "\n{} mods, {} resourcepacks, {} shaderpacks",
        manifest.mods.len(),
        manifest.resourcepacks.len(),
        manifest.shaderpacks.len()
    );
    println!("Total file size: {}", human_size(plan.total_size()));

    if !options.confirm {
        match answer(Confirm::new("Continue?").with_default(true).prompt())? {
            Some(true) => {}
            Some(false) => {
                println!("Cancelling...");
                return Ok(Exit::Cancelled);
            }
            None => return Ok(interrupted()),
        }
    }

    if options.install_modloader {
        let result = install_modloader(
            options,
            &manifest.minecraft.version,
            loader,
            loader_version,
            &client,
            &downloader,
        )
        .await?;
        match result {
            LoaderInstallResult::Installed => {
                println!("{} {} {}", "Installed".green(), loader, loader_version)
            }
            LoaderInstallResult::Unsupported => println!(
                "{}",
                "Couldn't install modloader because it isn't supported.".yellow()
            ),
        }
    }

    let bar = bytes_bar(plan.total_size(), "Downloading media");
    let report = download_files(&plan, &downloader, &bar).await?;
    bar.finish_and_clear();

    if report.skipped > 0 {
        println!(
            "Skipped {}/{} files that were already installed",
            report.skipped, report.total
        );
    }
    for warning in &report.warnings {
        println!(
            "{} {}",
            "! WARNING: Could not download".yellow(),
            warning
        );
    }
    println!(
        "{} {} of {} files downloaded to {}",
        "Done:".green().bold(),
        report.downloaded,
        report.total,
        options.install_dir.display()
    );
    Ok(Exit::Success)
}

fn print_warning(file_name: &str, warning: &DownloadWarning) {
    let line = if warning.is_host_not_found() {
        format!("! WARNING: The mod {} was not found: {}", file_name, warning.url)
    } else {
        format!("! WARNING: Could not download {}: {}", file_name, warning)
    };
    println!("{}", line.yellow());
}

// ── Interactive questions ───────────────────────────────

/// Returns `None` when the user interrupts a prompt.
fn ask_options(args: InteractiveArgs) -> LauncherResult<Option<InstallOptions>> {
    let Some(manifest) = answer(
        Text::new("Manifest file location:")
            .with_default(DEFAULT_MANIFEST)
            .prompt(),
    )?
    else {
        return Ok(None);
    };
    let Some(install_dir) = answer(
        Text::new("Install location:")
            .with_default(DEFAULT_INSTALL_DIR)
            .prompt(),
    )?
    else {
        return Ok(None);
    };
    let Some(side) = answer(
        Select::new("Install side:", vec![Side::Client, Side::Server]).prompt(),
    )?
    else {
        return Ok(None);
    };
    let Some(install_modloader) = answer(
        Confirm::new("Do you want to install the modloader?")
            .with_default(false)
            .prompt(),
    )?
    else {
        return Ok(None);
    };

    let launcher_dir = if install_modloader && side == Side::Client {
        let default = default_launcher_dir();
        let Some(dir) = answer(
            Text::new("Launcher location:")
                .with_default(&default.to_string_lossy())
                .prompt(),
        )?
        else {
            return Ok(None);
        };
        Some(PathBuf::from(dir))
    } else {
        None
    };

    let install_dir = absolute(Path::new(&install_dir))?;
    std::fs::create_dir_all(&install_dir).map_err(|e| LauncherError::io(&install_dir, e))?;
    println!();

    let mut options = InstallOptions::new(PathBuf::from(manifest), install_dir, side, launcher_dir);
    options.install_modloader = install_modloader;
    options.java = args.java;
    Ok(Some(options))
}

/// Split prompt results into an answer, an interruption (`None`) or an error.
fn answer<T>(result: Result<T, InquireError>) -> LauncherResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationInterrupted) | Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(LauncherError::Other(format!("Prompt failed: {}", e))),
    }
}

fn interrupted() -> Exit {
    println!();
    Exit::Interrupted
}

/// The launcher profile stores `gameDir` as-is, so it must not be relative.
fn absolute(path: &Path) -> LauncherResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| LauncherError::io(".", e))?;
    Ok(cwd.join(path))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn install_defaults() {
        let cli = Cli::try_parse_from(["mcm", "install"]).unwrap();
        let Command::Install(args) = cli.command else {
            panic!("expected install");
        };
        assert!(!args.yes);
        assert!(!args.skip_modloader);
        assert_eq!(args.manifest, PathBuf::from(DEFAULT_MANIFEST));
        assert_eq!(args.side, Side::Client);

        let options = args.into_options().unwrap();
        assert!(options.install_dir.is_absolute());
        assert!(options.install_dir.ends_with(DEFAULT_INSTALL_DIR));
        assert!(options.install_modloader);
        assert!(!options.confirm);
    }

    #[test]
    fn server_install_uses_install_dir_as_launcher_dir() {
        let cli = Cli::try_parse_from([
            "mcm", "install", "-y", "-o", "-s", "server", "-m", "pack.json", "-i", "/srv/mc",
            "-l", "/ignored", "--java", "/opt/jdk/bin/java",
        ])
        .unwrap();
        let Command::Install(args) = cli.command else {
            panic!("expected install");
        };
        let options = args.into_options().unwrap();

        assert_eq!(options.side, Side::Server);
        assert_eq!(options.launcher_dir, PathBuf::from("/srv/mc"));
        assert_eq!(options.manifest, PathBuf::from("pack.json"));
        assert_eq!(options.java, PathBuf::from("/opt/jdk/bin/java"));
        assert!(options.confirm);
        assert!(!options.install_modloader);
    }

    #[test]
    fn bad_side_is_rejected() {
        assert!(Cli::try_parse_from(["mcm", "install", "-s", "both"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["mcm", "cli", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Cli(_)));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Exit::Success.code(), 0);
        assert_eq!(Exit::Cancelled.code(), 0);
        assert_eq!(Exit::Interrupted.code(), 130);
    }

    #[test]
    fn prompt_interruption_is_not_an_error() {
        let interrupted: Result<bool, InquireError> = Err(InquireError::OperationInterrupted);
        assert!(matches!(answer(interrupted), Ok(None)));
        assert!(matches!(answer(Ok(true)), Ok(Some(true))));
    }

    #[test]
    fn headings() {
        assert_eq!(capitalize(&MediaKind::Resourcepack.folder()), "Resourcepacks");
        assert_eq!(capitalize(""), "");
    }
}
