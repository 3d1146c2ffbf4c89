//! IR construction errors.

use thiserror::Error;

/// An error raised while constructing IR nodes.
///
/// Construction errors are detected eagerly, at the point the malformed
/// node would be created, never deferred to emission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// A bit slice with a malformed range. Valid slices satisfy
    /// `0 <= start < stop <= width` of the sliced value.
    #[error("invalid slice [{start}:{stop}] of a {width}-bit value")]
    InvalidSlice {
        /// First selected bit (inclusive).
        start: u32,
        /// One past the last selected bit.
        stop: u32,
        /// Width of the value being sliced.
        width: u32,
    },
}
