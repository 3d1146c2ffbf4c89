//! Opaque hardware primitives.
//!
//! A [`Special`] is a primitive that cannot be reduced to plain statements
//! without a target-specific rule: a foreign instantiation, a tri-state
//! buffer, a memory, or an asynchronous reset synchronizer. Whether a kind
//! can be lowered is decided by the explicit rule registry in
//! `rivet_lower`; kinds that survive lowering are printed verbatim by the
//! backend's print registry. Both registries are keyed by [`SpecialTag`].

use crate::define_entity_id;
use crate::signal::SignalId;
use crate::value::Value;
use rivet_common::Const;
use serde::{Deserialize, Serialize};

define_entity_id!(
    /// Opaque, copyable ID for a special. Ascending IDs are creation order.
    SpecialId
);

/// The kind discriminant of a special, used to key the lowering-rule and
/// print-routine registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpecialTag {
    /// [`SpecialKind::Instance`].
    Instance,
    /// [`SpecialKind::Tristate`].
    Tristate,
    /// [`SpecialKind::Memory`].
    Memory,
    /// [`SpecialKind::AsyncResetSync`].
    AsyncResetSync,
}

impl SpecialTag {
    /// Returns the tag's stable display name.
    pub fn name(self) -> &'static str {
        match self {
            SpecialTag::Instance => "instance",
            SpecialTag::Tristate => "tristate",
            SpecialTag::Memory => "memory",
            SpecialTag::AsyncResetSync => "async_reset_sync",
        }
    }
}

/// One port binding of an [`Instance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstanceConnection {
    /// An input port driven by an expression.
    Input {
        /// The foreign port name.
        port: String,
        /// The driving value.
        value: Value,
    },
    /// An output port driving a signal.
    Output {
        /// The foreign port name.
        port: String,
        /// The driven signal.
        signal: SignalId,
    },
    /// A bidirectional port bound to a signal.
    InOut {
        /// The foreign port name.
        port: String,
        /// The bound signal.
        signal: SignalId,
    },
}

/// A verbatim instantiation of a foreign module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// The foreign module name.
    pub module: String,
    /// Parameter overrides, in declaration order.
    pub params: Vec<(String, Const)>,
    /// Port bindings, in declaration order.
    pub connections: Vec<InstanceConnection>,
}

/// A tri-state buffer on a bidirectional signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tristate {
    /// The bidirectional target signal.
    pub target: SignalId,
    /// The value driven when the buffer is enabled.
    pub output: Value,
    /// The active-high output enable.
    pub output_enable: Value,
    /// The signal receiving the pad value, if sampled.
    pub input: Option<SignalId>,
}

/// One access port of a [`Memory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPort {
    /// The clock domain the port is synchronous to.
    pub domain: String,
    /// The address value.
    pub address: Value,
    /// The signal carrying synchronously read data.
    pub data_read: SignalId,
    /// The write-enable value, if the port writes.
    pub write_enable: Option<Value>,
    /// The written data value, if the port writes.
    pub data_write: Option<Value>,
}

/// A synchronous-read memory array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// A base name used for the emitted array identifier.
    pub name_hint: String,
    /// Word width in bits.
    pub width: u32,
    /// Number of words.
    pub depth: u32,
    /// Initial word contents, at most `depth` entries.
    pub init: Vec<Const>,
    /// Access ports.
    pub ports: Vec<MemoryPort>,
}

/// An asynchronous reset synchronizer for one clock domain.
///
/// Retimes the asynchronous `trigger` into the domain's reset signal. The
/// built-in lowering rule replaces this with a two-flop synchronizer
/// instance; platform code may register a different rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncResetSync {
    /// The domain whose reset is driven.
    pub domain: String,
    /// The asynchronous reset request.
    pub trigger: Value,
}

/// The closed set of special kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpecialKind {
    /// A foreign instantiation, printed verbatim.
    Instance(Instance),
    /// A tri-state buffer.
    Tristate(Tristate),
    /// A memory array.
    Memory(Memory),
    /// An asynchronous reset synchronizer.
    AsyncResetSync(AsyncResetSync),
}

impl SpecialKind {
    /// Returns the registry key for this kind.
    pub fn tag(&self) -> SpecialTag {
        match self {
            SpecialKind::Instance(_) => SpecialTag::Instance,
            SpecialKind::Tristate(_) => SpecialTag::Tristate,
            SpecialKind::Memory(_) => SpecialTag::Memory,
            SpecialKind::AsyncResetSync(_) => SpecialTag::AsyncResetSync,
        }
    }

    /// Collects every signal referenced by this primitive into `out`,
    /// read and driven alike.
    pub fn referenced_signals(&self, out: &mut std::collections::BTreeSet<SignalId>) {
        match self {
            SpecialKind::Instance(inst) => {
                for conn in &inst.connections {
                    match conn {
                        InstanceConnection::Input { value, .. } => value.read_signals(out),
                        InstanceConnection::Output { signal, .. }
                        | InstanceConnection::InOut { signal, .. } => {
                            out.insert(*signal);
                        }
                    }
                }
            }
            SpecialKind::Tristate(tri) => {
                out.insert(tri.target);
                tri.output.read_signals(out);
                tri.output_enable.read_signals(out);
                if let Some(input) = tri.input {
                    out.insert(input);
                }
            }
            SpecialKind::Memory(mem) => {
                for port in &mem.ports {
                    port.address.read_signals(out);
                    out.insert(port.data_read);
                    if let Some(we) = &port.write_enable {
                        we.read_signals(out);
                    }
                    if let Some(dw) = &port.data_write {
                        dw.read_signals(out);
                    }
                }
            }
            SpecialKind::AsyncResetSync(sync) => sync.trigger.read_signals(out),
        }
    }

    /// Collects the signals this primitive drives into `out`.
    pub fn driven_signals(&self, out: &mut std::collections::BTreeSet<SignalId>) {
        match self {
            SpecialKind::Instance(inst) => {
                for conn in &inst.connections {
                    match conn {
                        InstanceConnection::Output { signal, .. }
                        | InstanceConnection::InOut { signal, .. } => {
                            out.insert(*signal);
                        }
                        InstanceConnection::Input { .. } => {}
                    }
                }
            }
            SpecialKind::Tristate(tri) => {
                out.insert(tri.target);
                if let Some(input) = tri.input {
                    out.insert(input);
                }
            }
            SpecialKind::Memory(mem) => {
                for port in &mem.ports {
                    out.insert(port.data_read);
                }
            }
            SpecialKind::AsyncResetSync(_) => {}
        }
    }
}

/// An opaque primitive stored in the design arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Special {
    /// The special's ID, which is also its creation id.
    pub id: SpecialId,
    /// The primitive payload.
    pub kind: SpecialKind,
}
