//! Common result and error types for programming errors.

/// Result type for operations that can only fail because of a bug in the caller
/// or in tether itself.
///
/// User-level failures (a deleted file, a pointer whose target is gone) are not
/// errors: they are modelled as `None` or as a crate-specific error enum.
pub type TetherResult<T> = Result<T, InternalError>;

/// A contract violation, such as touching an element after its tree was
/// replaced by a reparse.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the violated contract.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
