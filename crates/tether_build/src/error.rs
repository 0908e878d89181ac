//! Error types for build bookkeeping.

use std::path::PathBuf;

use tether_config::ConfigError;

/// Errors that can occur while tracking build outputs or copying resources.
///
/// Name collisions between compiled artifacts are not errors: the most recent
/// registration replaces the previous one.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An I/O error occurred while reading or writing build files or state.
    #[error("build I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A persisted target state file could not be parsed.
    #[error("failed to parse target state {path}: {reason}")]
    ManifestParse {
        /// The state file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// Target state could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The build was canceled through its compile context.
    #[error("build canceled")]
    Canceled,

    /// File generated events were already fired for this round.
    #[error("file generated events already fired for this round")]
    EventsAlreadyFired,

    /// An output was registered after the round's events were fired and
    /// before the consumer was cleared.
    #[error("output registered after the round was finalized")]
    RoundFinalized,

    /// A resource pattern could not be compiled.
    #[error("invalid resource pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the problem.
        reason: String,
    },

    /// The project configuration is invalid or names an unknown module.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}
