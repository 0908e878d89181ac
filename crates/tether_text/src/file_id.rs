//! Opaque identifier for virtual files and directories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an entry of the [`VirtualFileSystem`](crate::VirtualFileSystem).
///
/// Ids are never reused: a deleted file keeps its id, marked invalid, so that
/// pointers recorded against it resolve to nothing instead of to a newcomer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct VirtualFileId(u32);

impl VirtualFileId {
    /// Creates a `VirtualFileId` from a raw `u32` value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VirtualFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vf#{}", self.0)
    }
}
