//! Resource targets: which roots they copy from and the fingerprint that
//! guards incremental copying.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_common::Fingerprint;
use tether_config::{ResolvedModule, RootKind};

use crate::target::BuildTarget;

/// Contributes extra excluded directories for a module.
pub trait ExcludedRootProvider: Send + Sync {
    /// Directories of `module` whose content must not be copied.
    fn excluded_roots(&self, module: &ResolvedModule) -> Vec<PathBuf>;
}

/// A root a resources target copies files from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRoot {
    /// Absolute root directory.
    pub path: PathBuf,
    /// Dot-separated package prefix; files are copied under the matching
    /// directory of the output.
    pub package_prefix: String,
    /// Directories skipped while walking the root.
    pub excluded: Vec<PathBuf>,
}

impl ResourceRoot {
    /// Returns `true` if `path` lies in an excluded directory.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|ex| path.starts_with(ex))
    }

    /// The package prefix as a relative directory (`com.acme` → `com/acme`).
    pub fn prefix_dir(&self) -> PathBuf {
        self.package_prefix
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

/// Copies the resources of one module, production or test.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcesTarget {
    module: String,
    tests: bool,
}

impl ResourcesTarget {
    /// The resources target of `module`.
    pub fn new(module: impl Into<String>, tests: bool) -> Self {
        Self {
            module: module.into(),
            tests,
        }
    }

    /// Module name.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns `true` for test resources.
    pub fn is_tests(&self) -> bool {
        self.tests
    }

    /// The build target identity of this target.
    pub fn target(&self) -> BuildTarget {
        BuildTarget::resources(self.module.as_str(), self.tests)
    }

    /// Roots contributing to this target, in declaration order.
    ///
    /// Production targets take the non-generated source and resource roots,
    /// test targets the test ones. Each root is excluded from the module's
    /// excludes and from everything the `providers` report.
    pub fn compute_roots(
        &self,
        module: &ResolvedModule,
        providers: &[Arc<dyn ExcludedRootProvider>],
    ) -> Vec<ResourceRoot> {
        let mut excluded = module.excludes.clone();
        for provider in providers {
            excluded.extend(provider.excluded_roots(module));
        }

        module
            .roots
            .iter()
            .filter(|root| !root.generated && root.kind.is_tests() == self.tests)
            .filter(|root| !excluded.iter().any(|ex| root.path.starts_with(ex)))
            .map(|root| ResourceRoot {
                path: root.path.clone(),
                package_prefix: prefix_for(root.kind, &root.package_prefix),
                excluded: excluded.clone(),
            })
            .collect()
    }

    /// Configuration fingerprint: the sum of every pattern's hash plus, per
    /// root, the hash of its path and of its package prefix.
    ///
    /// Equal fingerprints are required, but not sufficient, for skipping a
    /// full copy.
    pub fn fingerprint<S: AsRef<str>>(
        &self,
        patterns: &[S],
        roots: &[ResourceRoot],
    ) -> Fingerprint {
        let patterns: Fingerprint = patterns.iter().map(|p| Fingerprint::of_str(p.as_ref())).sum();
        let roots: Fingerprint = roots
            .iter()
            .map(|root| {
                Fingerprint::of_path(&root.path).combine(Fingerprint::of_str(&root.package_prefix))
            })
            .sum();
        patterns.combine(roots)
    }

    /// Writes the configuration fingerprint to `out` as lower-case hex.
    pub fn write_configuration<S: AsRef<str>>(
        &self,
        patterns: &[S],
        roots: &[ResourceRoot],
        out: &mut impl Write,
    ) -> std::io::Result<()> {
        write!(out, "{}", self.fingerprint(patterns, roots))
    }

    /// Where this target's resources are copied to.
    pub fn output_dir<'m>(&self, module: &'m ResolvedModule) -> &'m Path {
        module.output_dir(self.tests)
    }
}

// Package prefixes only apply to source roots; resource roots are copied as is.
fn prefix_for(kind: RootKind, prefix: &str) -> String {
    if kind.is_resource() {
        String::new()
    } else {
        prefix.to_string()
    }
}
