// ─── Java Runtime ───
// Probes the Java binary processors run on and checks it against the
// version Minecraft needs.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaInstallation {
    pub path: PathBuf,
    pub version: String,
    pub major: u32,
    pub vendor: String,
}

/// Run `<java> --version` and describe the runtime it reports.
pub async fn ensure_java(java_bin: &Path) -> LauncherResult<JavaInstallation> {
    let output = tokio::process::Command::new(java_bin)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| LauncherError::JavaNotFound(format!("{}: {}", java_bin.display(), e)))?;

    if !output.status.success() {
        return Err(LauncherError::JavaNotFound(format!(
            "{} --version exited with {:?}",
            java_bin.display(),
            output.status.code()
        )));
    }

    let text = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    debug!("Probing {:?}: {}", java_bin, text.lines().next().unwrap_or(""));

    let version = parse_version_string(&text).unwrap_or_default();
    Ok(JavaInstallation {
        path: java_bin.to_path_buf(),
        major: parse_major_version(&version),
        vendor: parse_vendor(&text),
        version,
    })
}

/// Warn when `java` is older than what `minecraft_version` needs.
///
/// `required` overrides the built-in table, e.g. with the `javaVersion` of
/// the version JSON. Returns whether the runtime is recent enough.
pub fn check_java_for_minecraft(
    java: &JavaInstallation,
    minecraft_version: &str,
    required: Option<u32>,
) -> bool {
    let required = required.unwrap_or_else(|| required_java_for_minecraft_version(minecraft_version));
    if java.major != 0 && java.major < required {
        warn!(
            "Minecraft {} needs Java {} but {} reports Java {}",
            minecraft_version,
            required,
            java.path.display(),
            java.major
        );
        return false;
    }
    true
}

pub fn required_java_for_minecraft_version(minecraft_version: &str) -> u32 {
    let lower = minecraft_version.to_ascii_lowercase();
    if let Some(week_pos) = lower.find('w') {
        let year_hint = &lower[..week_pos];
        if year_hint.len() >= 2 {
            let year_suffix = &year_hint[year_hint.len() - 2..];
            if let Ok(snapshot_year) = year_suffix.parse::<u32>() {
                if snapshot_year >= 24 {
                    return 21;
                }
                return 17;
            }
        }
    }

    let mut parts = minecraft_version.split('.');
    let major = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(1);
    let minor = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(20);
    let patch = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(0);

    if major > 1 || minor >= 21 || (minor == 20 && patch >= 5) {
        21
    } else if minor >= 17 {
        17
    } else {
        8
    }
}

fn parse_major_version(version: &str) -> u32 {
    let first_part = version.split('.').next().unwrap_or("0");
    let major: u32 = first_part.parse().unwrap_or(0);

    if major == 1 {
        version
            .split('.')
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(major)
    } else {
        major
    }
}

/// `openjdk 17.0.8 2023-07-18` or `openjdk version "1.8.0_392"`.
fn parse_version_string(output: &str) -> Option<String> {
    for line in output.lines() {
        if let Some(start) = line.find('"') {
            if let Some(end) = line[start + 1..].find('"') {
                return Some(line[start + 1..start + 1 + end].to_string());
            }
        }
    }

    output
        .lines()
        .next()?
        .split_whitespace()
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))
        .map(|token| token.split(['+', '-']).next().unwrap_or(token).to_string())
}

fn parse_vendor(output: &str) -> String {
    for line in output.lines() {
        if line.contains("Temurin") {
            return "Temurin".to_string();
        }
        if line.contains("Adoptium") {
            return "Adoptium".to_string();
        }
        if line.contains("OpenJDK") {
            return "OpenJDK".to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major_modern() {
        assert_eq!(parse_major_version("17.0.8"), 17);
        assert_eq!(parse_major_version("21.0.1"), 21);
    }

    #[test]
    fn test_parse_major_legacy() {
        assert_eq!(parse_major_version("1.8.0_392"), 8);
    }

    #[test]
    fn version_from_long_option_output() {
        let out = "openjdk 17.0.8 2023-07-18\nOpenJDK Runtime Environment Temurin-17.0.8+7 (build 17.0.8+7)\n";
        assert_eq!(parse_version_string(out).as_deref(), Some("17.0.8"));
        assert_eq!(parse_vendor(out), "Temurin");

        let oracle = "java 21.0.1 2023-10-17 LTS\nJava(TM) SE Runtime Environment (build 21.0.1+12-LTS-29)";
        assert_eq!(parse_version_string(oracle).as_deref(), Some("21.0.1"));
    }

    #[test]
    fn version_from_quoted_output() {
        let out = "openjdk version \"1.8.0_392\"\nOpenJDK Runtime Environment (build 1.8.0_392-b08)";
        assert_eq!(parse_version_string(out).as_deref(), Some("1.8.0_392"));
    }

    #[test]
    fn java_required_by_minecraft_version() {
        assert_eq!(required_java_for_minecraft_version("1.16.5"), 8);
        assert_eq!(required_java_for_minecraft_version("1.20.4"), 17);
        assert_eq!(required_java_for_minecraft_version("1.20.5"), 21);
        assert_eq!(required_java_for_minecraft_version("24w14a"), 21);
    }

    #[test]
    fn old_java_is_flagged() {
        let java = JavaInstallation {
            path: PathBuf::from("java"),
            version: "1.8.0_392".into(),
            major: 8,
            vendor: "OpenJDK".into(),
        };
        assert!(!check_java_for_minecraft(&java, "1.20.1", None));
        assert!(check_java_for_minecraft(&java, "1.12.2", None));
        assert!(check_java_for_minecraft(&java, "1.20.1", Some(8)));
    }

    #[tokio::test]
    async fn missing_binary_is_java_not_found() {
        let err = ensure_java(Path::new("no-such-java-binary-here")).await.unwrap_err();
        assert!(matches!(err, LauncherError::JavaNotFound(_)));
    }
}
