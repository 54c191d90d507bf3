pub mod profiles;

pub use profiles::{inject_profile, LauncherProfile, LAUNCHER_PROFILES_FILE};
