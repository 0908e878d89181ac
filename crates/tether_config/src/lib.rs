//! Parsing and validation of `tether.toml` project configuration files.
//!
//! This crate reads the project model (modules, their source and resource
//! roots, excludes, dependencies and the compiler's resource patterns) into a
//! strongly-typed [`ProjectConfig`], and resolves modules to absolute paths
//! and output directories.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_module, ResolvedModule, ResolvedRoot};
pub use types::*;
