use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::core::config::{both_sides, Side};
use crate::core::version::LibraryEntry;

/// Subset of Forge's `install_profile.json`.
#[derive(Debug, Deserialize)]
pub struct InstallProfile {
    pub data: BTreeMap<String, SidedValue>,
    pub processors: Vec<Processor>,
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A `data` value, given once per side.
#[derive(Debug, Clone, Deserialize)]
pub struct SidedValue {
    pub client: String,
    pub server: String,
}

impl SidedValue {
    pub fn for_side(&self, side: Side) -> &str {
        match side {
            Side::Client => &self.client,
            Side::Server => &self.server,
        }
    }
}

/// One post-install step.
#[derive(Debug, Clone, Deserialize)]
pub struct Processor {
    pub jar: String,
    #[serde(default)]
    pub classpath: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "both_sides")]
    pub sides: Vec<Side>,
}

impl Processor {
    pub fn runs_on(&self, side: Side) -> bool {
        self.sides.contains(&side)
    }
}

/// Paths every processor may refer to by name.
pub struct FixedVariables<'a> {
    pub installer: &'a Path,
    pub minecraft_jar: &'a Path,
    pub root: &'a Path,
    pub side: Side,
}

impl InstallProfile {
    /// The substitution context for `side`.
    ///
    /// Profile values are taken for the active side, with `'quoted'` literals
    /// unwrapped. `INSTALLER`, `MINECRAFT_JAR`, `ROOT` and `SIDE` override any
    /// profile entry of the same name.
    pub fn data_context(&self, fixed: &FixedVariables<'_>) -> HashMap<String, String> {
        let mut data: HashMap<String, String> = self
            .data
            .iter()
            .map(|(key, value)| (key.clone(), unquote(value.for_side(fixed.side)).to_string()))
            .collect();

        data.insert("INSTALLER".into(), path_string(fixed.installer));
        data.insert("MINECRAFT_JAR".into(), path_string(fixed.minecraft_jar));
        data.insert("ROOT".into(), path_string(fixed.root));
        data.insert("SIDE".into(), fixed.side.to_string());
        data
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
