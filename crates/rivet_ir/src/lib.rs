//! The Rivet intermediate representation.
//!
//! This crate defines the logic-graph IR shared by every pipeline stage:
//! immutable [`Value`] expression trees over arena-allocated [`Signal`]s,
//! behavioral [`Statement`]s, [`ClockDomain`]s, opaque [`Special`]
//! primitives, and the composable [`Fragment`] compilation unit.

#![warn(missing_docs)]

pub mod arena;
pub mod design;
pub mod domain;
pub mod error;
pub mod fragment;
pub mod signal;
pub mod special;
pub mod stmt;
pub mod value;

pub use arena::{Arena, EntityId};
pub use design::Design;
pub use domain::ClockDomain;
pub use error::IrError;
pub use fragment::Fragment;
pub use signal::{Signal, SignalId, SignalSpec, TraceContext, TraceStep};
pub use special::{
    AsyncResetSync, Instance, InstanceConnection, Memory, MemoryPort, Special, SpecialId,
    SpecialKind, SpecialTag, Tristate,
};
pub use stmt::{read_signals, target_signals, written_signals, CaseArm, Statement};
pub use value::{BinaryOp, Shape, UnaryOp, Value};
