mod coordinate;

pub use coordinate::MavenCoordinate;

/// Maven repository hosting Forge and its installers.
pub const FORGE_MAVEN: &str = "https://maven.minecraftforge.net";
