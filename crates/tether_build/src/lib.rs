//! Build-side bookkeeping for incremental builds.
//!
//! This crate models build targets and the chunks they are built in, tracks
//! which outputs every target produced during a round
//! ([`ChunkBuildOutputs`]), persists per-target state between builds
//! ([`BuildDataManager`]) and copies resources incrementally
//! ([`ResourceBuilder`]), guarded by a [`ResourcesTarget`] configuration
//! fingerprint.

#![warn(missing_docs)]

pub mod artifact;
pub mod builder;
pub mod context;
pub mod data;
pub mod error;
pub mod hasher;
pub mod index;
pub mod manifest;
pub mod outputs;
pub mod patterns;
pub mod resources;
pub mod target;

pub use artifact::CompiledArtifact;
pub use builder::{ResourceBuildStats, ResourceBuilder};
pub use context::{
    BuildListener, BuildMessage, BuildMode, BuildSession, CompileContext, FileGeneratedEvent,
    GeneratedFile, MessageLog,
};
pub use data::BuildDataManager;
pub use error::BuildError;
pub use hasher::{ChangeSet, SourceHasher};
pub use index::BuildTargetIndex;
pub use manifest::TargetState;
pub use outputs::{ChunkBuildOutputs, TargetOutputs};
pub use patterns::ResourcePatterns;
pub use resources::{ExcludedRootProvider, ResourceRoot, ResourcesTarget};
pub use target::{BuildTarget, TargetChunk, TargetKind};
