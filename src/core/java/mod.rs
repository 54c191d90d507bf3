pub mod runtime;

pub use runtime::{check_java_for_minecraft, ensure_java, required_java_for_minecraft_version, JavaInstallation};
