// ─── MCM Core ───
// Modpack installation backend: media downloads plus a Forge installer.
//
// Architecture:
//   core/
//     config      — Install options, sides, platform defaults
//     error       — Crate-wide error type
//     http        — Shared reqwest client + browser headers
//     progress    — Terminal progress bars
//     downloader/ — Fetch capability, streaming HTTP downloads
//     version/    — Mojang manifest + version JSON + OS rules
//     maven/      — Maven coordinates
//     java/       — Java binary probe
//     launcher/   — launcher_profiles.json
//     loaders/    — Modloader dispatch, Forge install pipeline
//     media/      — Modpack manifest, media URLs, media downloads

pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod java;
pub mod launcher;
pub mod loaders;
pub mod maven;
pub mod media;
pub mod progress;
pub mod version;
