//! Shared foundational types used across the tether workspace.
//!
//! This crate provides content hashing for change detection, cheap 32-bit
//! fingerprints for configuration guards, interned identifiers for element
//! kinds and languages, internal error types, and logging setup.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod logging;
pub mod result;

pub use hash::{ContentHash, Fingerprint};
pub use ident::{Ident, Interner};
pub use result::{InternalError, TetherResult};
