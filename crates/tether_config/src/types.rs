//! Configuration types deserialized from `tether.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Resource patterns used when `[compiler] resource_patterns` is absent:
/// everything except the sources of the JVM languages.
pub const DEFAULT_RESOURCE_PATTERNS: &[&str] = &[
    "!?*.java",
    "!?*.form",
    "!?*.class",
    "!?*.groovy",
    "!?*.scala",
    "!?*.flex",
    "!?*.kt",
    "!?*.clj",
];

/// The top-level project configuration parsed from `tether.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata and output layout.
    pub project: ProjectMeta,
    /// Compiler settings shared by all modules.
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Modules by name.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,
}

/// Core project metadata required in every `tether.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Output directory, relative to the project directory.
    #[serde(default = "default_output")]
    pub output: String,
    /// Directory holding persisted build state, relative to the project
    /// directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_output() -> String {
    "out".to_string()
}

fn default_data_dir() -> String {
    ".tether".to_string()
}

/// Compiler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerConfig {
    /// Wildcard patterns selecting resource files, in order.
    ///
    /// Accepts a list or a single `;`-separated string.
    #[serde(
        default = "default_resource_patterns",
        deserialize_with = "deserialize_pattern_list"
    )]
    pub resource_patterns: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            resource_patterns: default_resource_patterns(),
        }
    }
}

fn default_resource_patterns() -> Vec<String> {
    DEFAULT_RESOURCE_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Deserializes `"a;b"` or `["a", "b"]` into a list of patterns.
fn deserialize_pattern_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PatternList;

    impl<'de> Visitor<'de> for PatternList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a `;`-separated string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect())
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut patterns = Vec::new();
            while let Some(pattern) = seq.next_element::<String>()? {
                patterns.push(pattern);
            }
            Ok(patterns)
        }
    }

    deserializer.deserialize_any(PatternList)
}

/// One module of the project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleConfig {
    /// Names of the modules this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Excluded directories, relative to the project directory.
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Source and resource roots.
    #[serde(default)]
    pub roots: Vec<SourceRootConfig>,
}

/// A source or resource root of a module.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRootConfig {
    /// Root directory, relative to the project directory.
    pub path: String,
    /// What the root holds.
    #[serde(default)]
    pub kind: RootKind,
    /// Package prefix prepended to the relative path of every file under the
    /// root, dot-separated (`com.example`).
    #[serde(default)]
    pub package_prefix: String,
    /// Whether the root is written by a generator rather than by hand.
    #[serde(default)]
    pub generated: bool,
}

/// The kind of a source root.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RootKind {
    /// Production sources (default).
    #[default]
    Source,
    /// Test sources.
    TestSource,
    /// Production resources.
    Resource,
    /// Test resources.
    TestResource,
}

impl RootKind {
    /// Returns `true` for test roots.
    pub fn is_tests(self) -> bool {
        matches!(self, RootKind::TestSource | RootKind::TestResource)
    }

    /// Returns `true` for resource roots.
    pub fn is_resource(self) -> bool {
        matches!(self, RootKind::Resource | RootKind::TestResource)
    }
}
