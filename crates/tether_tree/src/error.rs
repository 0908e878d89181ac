//! Error types for tree and workspace operations.

use tether_common::InternalError;
use tether_text::{TextError, VirtualFileId};

/// Errors raised by the [`Workspace`](crate::Workspace).
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// No file with this id is known to the workspace, or it was deleted.
    #[error("unknown file {0}")]
    UnknownFile(VirtualFileId),

    /// The operation needs a text document but the file is compiled or a
    /// directory.
    #[error("{0} is not a source file")]
    NotASourceFile(VirtualFileId),

    /// The operation needs a compiled file.
    #[error("{0} is not a compiled file")]
    NotCompiled(VirtualFileId),

    /// No parser is registered for the language.
    #[error("no parser registered for language `{0}`")]
    UnknownLanguage(String),

    /// A document or file system operation failed.
    #[error(transparent)]
    Text(#[from] TextError),

    /// An element was used after its tree was invalidated.
    #[error(transparent)]
    InvalidElement(#[from] InternalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let file = VirtualFileId::from_raw(2);
        assert_eq!(TreeError::UnknownFile(file).to_string(), "unknown file vf#2");
        assert_eq!(
            TreeError::UnknownLanguage("kotlin".into()).to_string(),
            "no parser registered for language `kotlin`"
        );
        let text: TreeError = TextError::UnknownFile(file).into();
        assert_eq!(text.to_string(), "unknown virtual file vf#2");
    }
}
