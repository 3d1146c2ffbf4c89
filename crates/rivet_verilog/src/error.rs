//! Emission errors.

use rivet_common::InternalError;
use rivet_ir::SpecialTag;
use thiserror::Error;

/// An error aborting emission.
///
/// There is no partial-output mode: any of these means nothing is written.
#[derive(Debug, Error)]
pub enum EmitError {
    /// A special survived lowering but no print routine is registered for
    /// its kind. This is a configuration error in the platform's registry
    /// setup, not a recoverable condition.
    #[error("no print routine registered for special #{id} of kind `{kind}`", kind = .kind.name())]
    UnprintableSpecial {
        /// The raw ID of the offending special.
        id: u32,
        /// The unprintable kind.
        kind: SpecialTag,
    },

    /// A pipeline invariant was violated upstream (e.g. a slice over a
    /// non-signal reached the printer).
    #[error(transparent)]
    Internal(#[from] InternalError),
}
