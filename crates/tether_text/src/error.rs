//! Error types for text and virtual file operations.

use std::path::PathBuf;

use crate::file_id::VirtualFileId;

/// Errors raised by documents and the virtual file system.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// A range or offset lies outside the document text.
    #[error("range {start}..{end} is out of bounds for text of length {len}")]
    OutOfBounds {
        /// Start offset of the offending range.
        start: u32,
        /// End offset of the offending range.
        end: u32,
        /// Current text length.
        len: u32,
    },

    /// An offset falls inside a multi-byte character.
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary {
        /// The offending offset.
        offset: u32,
    },

    /// No virtual file with this id exists.
    #[error("unknown virtual file {0}")]
    UnknownFile(VirtualFileId),

    /// A live entry already exists at this path.
    #[error("a virtual file already exists at {0}")]
    AlreadyExists(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_display() {
        let err = TextError::OutOfBounds {
            start: 4,
            end: 12,
            len: 10,
        };
        assert_eq!(
            err.to_string(),
            "range 4..12 is out of bounds for text of length 10"
        );
    }

    #[test]
    fn unknown_file_display() {
        let err = TextError::UnknownFile(VirtualFileId::from_raw(3));
        assert_eq!(err.to_string(), "unknown virtual file vf#3");
    }
}
