//! Lowering pipeline errors.
//!
//! Every pass fails fast with one of these variants; no pass is retried
//! and no partially lowered fragment escapes the pipeline.

use thiserror::Error;

/// An error aborting the lowering pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LowerError {
    /// A synchronous statement references a clock domain that is neither
    /// declared nor allowed to be created implicitly.
    #[error("synchronous statements reference undeclared clock domain `{0}`")]
    UnresolvedClockDomain(String),

    /// Fixed-point special lowering failed to converge. This indicates a
    /// rule set bug, typically a rule that reintroduces its own kind.
    #[error("special lowering did not converge after {rounds} rounds ({pending} special(s) still pending)")]
    NonTerminatingLowering {
        /// Rounds executed before giving up.
        rounds: usize,
        /// Specials still awaiting lowering.
        pending: usize,
    },
}
