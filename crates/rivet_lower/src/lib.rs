//! The Rivet lowering pipeline.
//!
//! Transforms a flattened [`Fragment`] into backend-printable form through
//! a fixed sequence of passes:
//!
//! 1. clock-domain resolution ([`domains`])
//! 2. reset injection ([`reset`])
//! 3. slice normalization ([`slices`])
//! 4. control-statement canonicalization ([`control`])
//! 5. fixed-point special lowering ([`specials`])
//!
//! Each pass runs exactly once, fails fast, and never observes the output
//! of a later pass.

#![warn(missing_docs)]

pub mod control;
pub mod domains;
pub mod error;
pub mod reset;
pub mod slices;
pub mod specials;

pub use error::LowerError;
pub use specials::{LowerRule, LoweringRegistry};

use rivet_ir::{Design, Fragment, SignalId};
use serde::{Deserialize, Serialize};

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowerConfig {
    /// Create a fresh clock domain for every undeclared domain name
    /// referenced by synchronous statements. When disabled, such a
    /// reference is an [`LowerError::UnresolvedClockDomain`].
    pub create_missing_domains: bool,
    /// Create implicit domains without a reset signal.
    pub reset_less_domains: bool,
}

impl Default for LowerConfig {
    fn default() -> Self {
        Self {
            create_missing_domains: true,
            reset_less_domains: false,
        }
    }
}

/// The result of a pipeline run.
#[derive(Debug, Clone)]
pub struct LowerOutput {
    /// The fully lowered fragment.
    pub fragment: Fragment,
    /// Signals created by clock-domain resolution that must become
    /// top-level ports, in creation order.
    pub new_ports: Vec<SignalId>,
}

/// Runs the whole pipeline on a fragment.
pub fn lower(
    fragment: Fragment,
    design: &mut Design,
    registry: &LoweringRegistry,
    config: &LowerConfig,
) -> Result<LowerOutput, LowerError> {
    let mut fragment = fragment;
    let new_ports = domains::resolve_domains(&mut fragment, design, config)?;
    reset::insert_resets(&mut fragment, design);
    slices::normalize_slices(&mut fragment, design);
    control::canonicalize_comb(&mut fragment, design);
    let fragment = specials::lower_specials(fragment, design, registry)?;
    Ok(LowerOutput {
        fragment,
        new_ports,
    })
}
