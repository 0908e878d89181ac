//! Virtual files, text ranges, documents and range markers.
//!
//! This crate provides the [`VirtualFileSystem`] that hands out stable
//! [`VirtualFileId`]s, the [`TextRange`] and [`TextEdit`] primitives, and the
//! [`Document`] text buffer whose [`RangeMarker`]s follow edits.

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod file_id;
pub mod range;
pub mod vfs;

pub use document::{Document, RangeMarker};
pub use error::TextError;
pub use file_id::VirtualFileId;
pub use range::{shift_range, TextEdit, TextRange};
pub use vfs::{VirtualFile, VirtualFileKind, VirtualFileSystem};
