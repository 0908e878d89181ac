//! Build targets and target chunks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of output a [`BuildTarget`] produces.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Compiled production classes of a module.
    Production,
    /// Compiled test classes of a module.
    Tests,
    /// Production resources of a module.
    ProductionResources,
    /// Test resources of a module.
    TestResources,
}

impl TargetKind {
    /// Every kind, in the order targets are created for a module.
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Production,
        TargetKind::Tests,
        TargetKind::ProductionResources,
        TargetKind::TestResources,
    ];

    /// Returns `true` for test kinds.
    pub fn is_tests(self) -> bool {
        matches!(self, TargetKind::Tests | TargetKind::TestResources)
    }

    /// Returns `true` for resource kinds.
    pub fn is_resources(self) -> bool {
        matches!(
            self,
            TargetKind::ProductionResources | TargetKind::TestResources
        )
    }

    /// Stable name, used for persisted state directories.
    pub fn id(self) -> &'static str {
        match self {
            TargetKind::Production => "production",
            TargetKind::Tests => "tests",
            TargetKind::ProductionResources => "resources-production",
            TargetKind::TestResources => "resources-tests",
        }
    }
}

/// A unit of compilation output: one kind of output of one module.
///
/// Targets have value identity and are used as map keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct BuildTarget {
    kind: TargetKind,
    module: String,
}

impl BuildTarget {
    /// Creates a target of `kind` for `module`.
    pub fn new(kind: TargetKind, module: impl Into<String>) -> Self {
        Self {
            kind,
            module: module.into(),
        }
    }

    /// Production classes of `module`.
    pub fn production(module: impl Into<String>) -> Self {
        Self::new(TargetKind::Production, module)
    }

    /// Test classes of `module`.
    pub fn tests(module: impl Into<String>) -> Self {
        Self::new(TargetKind::Tests, module)
    }

    /// Production or test resources of `module`.
    pub fn resources(module: impl Into<String>, tests: bool) -> Self {
        let kind = if tests {
            TargetKind::TestResources
        } else {
            TargetKind::ProductionResources
        };
        Self::new(kind, module)
    }

    /// Target kind.
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Module name.
    pub fn module(&self) -> &str {
        &self.module
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.id(), self.module)
    }
}

/// A set of mutually dependent targets built together in one round.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TargetChunk {
    targets: Vec<BuildTarget>,
}

impl TargetChunk {
    /// Creates a chunk; targets are kept sorted.
    pub fn new(mut targets: Vec<BuildTarget>) -> Self {
        targets.sort();
        targets.dedup();
        Self { targets }
    }

    /// Targets of this chunk.
    pub fn targets(&self) -> &[BuildTarget] {
        &self.targets
    }

    /// Returns `true` if `target` belongs to this chunk.
    pub fn contains(&self, target: &BuildTarget) -> bool {
        self.targets.binary_search(target).is_ok()
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if the chunk has no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl fmt::Display for TargetChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, target) in self.targets.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{target}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_identity() {
        assert_eq!(BuildTarget::production("core"), BuildTarget::production("core"));
        assert_ne!(BuildTarget::production("core"), BuildTarget::tests("core"));
        assert_eq!(
            BuildTarget::resources("core", true).kind(),
            TargetKind::TestResources
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            BuildTarget::resources("app", false).to_string(),
            "resources-production:app"
        );
        let chunk = TargetChunk::new(vec![BuildTarget::tests("b"), BuildTarget::production("a")]);
        assert_eq!(chunk.to_string(), "production:a, tests:b");
    }

    #[test]
    fn chunk_contains() {
        let chunk = TargetChunk::new(vec![
            BuildTarget::production("a"),
            BuildTarget::production("b"),
            BuildTarget::production("a"),
        ]);
        assert_eq!(chunk.len(), 2);
        assert!(chunk.contains(&BuildTarget::production("b")));
        assert!(!chunk.contains(&BuildTarget::tests("b")));
    }

    #[test]
    fn kind_queries() {
        assert!(TargetKind::TestResources.is_tests());
        assert!(TargetKind::TestResources.is_resources());
        assert!(!TargetKind::Production.is_resources());
    }
}
