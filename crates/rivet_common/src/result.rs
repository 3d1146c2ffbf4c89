//! Common result and error types for the Rivet compiler.

/// The standard result type for operations whose only failure mode is an
/// internal invariant violation.
///
/// All user-observable failures in the compiler have their own typed error
/// enums in the crate that detects them; `Err` here always means a bug in
/// Rivet itself. Nothing is retried: an `InternalError` aborts the whole
/// compilation.
pub type RivetResult<T> = Result<T, InternalError>;

/// An internal compiler error indicating a bug in Rivet, not a problem with
/// the input design.
///
/// These errors should never occur during normal operation. If one does
/// occur, it means a pipeline invariant was violated upstream.
#[derive(Debug, thiserror::Error)]
#[error("internal compiler error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
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
