//! Compiled artifacts produced during a round.

use std::path::PathBuf;
use std::sync::Arc;

/// One output unit produced by a compiler or resource copier.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CompiledArtifact {
    /// Fully qualified class name; `None` for non-class outputs.
    pub class_name: Option<String>,
    /// Binary content as produced, before or after it was written to disk.
    pub content: Arc<[u8]>,
    /// The source file this artifact was produced from.
    pub source: PathBuf,
    /// Where the artifact is written.
    pub output: PathBuf,
}

impl CompiledArtifact {
    /// A compiled class.
    pub fn class(
        name: impl Into<String>,
        content: impl Into<Arc<[u8]>>,
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            class_name: Some(name.into()),
            content: content.into(),
            source: source.into(),
            output: output.into(),
        }
    }

    /// An output without a logical name, such as a copied resource.
    pub fn unnamed(
        content: impl Into<Arc<[u8]>>,
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            class_name: None,
            content: content.into(),
            source: source.into(),
            output: output.into(),
        }
    }
}
