//! Shared foundational types used across the Rivet compiler.
//!
//! This crate provides the two's-complement constant value type used for
//! literals and reset values, and the common result types for internal
//! invariant violations.

#![warn(missing_docs)]

pub mod consts;
pub mod result;

pub use consts::Const;
pub use result::{InternalError, RivetResult};
