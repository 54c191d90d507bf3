use super::manifest::{Media, MediaSource};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::FORGE_MAVEN;

const CURSEFORGE_CDN: &str = "https://mediafilez.forgecdn.net/files";
const MODRINTH_CDN: &str = "https://cdn-raw.modrinth.com/data";
const PLANET_MINECRAFT_CDN: &str = "https://static.planetminecraft.com/files/resource_media";

/// Download URL for a media entry. `name` is used as given, percent-encoding
/// included.
pub fn media_url(media: &Media) -> LauncherResult<String> {
    let url = match &media.source {
        MediaSource::Cf { id } => {
            let (head, tail) = split_curseforge_id(id).ok_or_else(|| {
                LauncherError::Manifest(format!(
                    "Invalid CurseForge file id '{}' for {}",
                    id, media.slug
                ))
            })?;
            format!("{}/{}/{}/{}", CURSEFORGE_CDN, head, tail, media.name)
        }
        MediaSource::Mr { id } => {
            if id.len() <= 8 || !id.is_char_boundary(8) {
                return Err(LauncherError::Manifest(format!(
                    "Invalid Modrinth id '{}' for {}",
                    id, media.slug
                )));
            }
            let (project, version) = id.split_at(8);
            format!("{}/{}/versions/{}/{}", MODRINTH_CDN, project, version, media.name)
        }
        MediaSource::Pm { media: category } => {
            format!("{}/{}/{}", PLANET_MINECRAFT_CDN, category, media.name)
        }
        MediaSource::Url { url } => url.clone(),
    };
    Ok(url)
}

/// CurseForge shards files by the first four digits of the id; both halves
/// lose their leading zeros.
fn split_curseforge_id(id: &str) -> Option<(u64, u64)> {
    if id.len() <= 4 || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (head, tail) = id.split_at(4);
    Some((head.parse().ok()?, tail.parse().ok()?))
}

/// Where the official Forge installer jar for a version lives.
pub fn forge_installer_url(minecraft_version: &str, forge_version: &str) -> String {
    format!(
        "{maven}/net/minecraftforge/forge/{mc}-{forge}/forge-{mc}-{forge}-installer.jar",
        maven = FORGE_MAVEN,
        mc = minecraft_version,
        forge = forge_version
    )
}
