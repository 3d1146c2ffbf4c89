//! Signals and their construction backtraces.
//!
//! A [`Signal`] is the leaf of the value graph: a named bit vector with a
//! fixed width, signedness, and reset value. Signals are created through
//! [`Design::add_signal`](crate::design::Design::add_signal) and never
//! mutated afterwards; their [`SignalId`] doubles as the creation id used
//! for all deterministic ordering.

use crate::define_entity_id;
use rivet_common::Const;
use serde::{Deserialize, Serialize};

define_entity_id!(
    /// Opaque, copyable ID for a signal. Ascending IDs are creation order.
    SignalId
);

/// The owning context of one backtrace step.
///
/// The namer uses the context to disambiguate signals that present the same
/// declared name at the same hierarchy depth: two *different* objects with
/// the same type name force a type-derived prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceContext {
    /// A plain string context, such as the design root or a free-standing
    /// statement group.
    Label(String),
    /// An owning builder object, identified by its type name and a
    /// per-compilation instance number.
    Object {
        /// The owner's type name (e.g. `"Counter"`).
        type_name: String,
        /// The owner's instance number within the compilation.
        instance: u32,
    },
}

impl TraceContext {
    /// Returns the lower-cased name the namer falls back to when a step
    /// carries no declared name.
    pub fn fallback_name(&self) -> String {
        match self {
            TraceContext::Label(label) => label.to_lowercase(),
            TraceContext::Object { type_name, .. } => type_name.to_lowercase(),
        }
    }
}

/// One step of a signal's construction backtrace, outermost first.
///
/// `name` is the name the entity was declared under at this level: the
/// submodule name for intermediate steps, the signal's own declared name
/// for the terminal step. `None` means the entity was anonymous at this
/// level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// The context that owned the declaration.
    pub context: TraceContext,
    /// The declared name, if any.
    pub name: Option<String>,
}

impl TraceStep {
    /// Creates a backtrace step.
    pub fn new(context: TraceContext, name: Option<&str>) -> Self {
        Self {
            context,
            name: name.map(str::to_owned),
        }
    }

    /// Returns the raw name this step presents to the namer.
    pub fn raw_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.context.fallback_name(),
        }
    }
}

/// A signal: the leaf value of the logic graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// The signal's ID, which is also its creation id.
    pub id: SignalId,
    /// The bit width, positive and fixed at creation.
    pub width: u32,
    /// Whether arithmetic on this signal is two's-complement signed.
    pub signed: bool,
    /// The reset value, always of the signal's own width.
    pub reset: Const,
    /// An explicit flat name that bypasses the namer, if set.
    pub name_override: Option<String>,
    /// The construction backtrace, outermost step first. The final step is
    /// the terminal one: its name is the signal's own declared name.
    pub backtrace: Vec<TraceStep>,
}

/// The attributes of a signal to be created, with builder-style defaults:
/// unsigned, reset to zero, no override, empty backtrace.
#[derive(Debug, Clone)]
pub struct SignalSpec {
    /// The bit width. Must be positive.
    pub width: u32,
    /// Signedness. Defaults to unsigned.
    pub signed: bool,
    /// The reset value. Defaults to zero; rewrapped to `width` at creation.
    pub reset: Const,
    /// Explicit flat name override. Defaults to none.
    pub name_override: Option<String>,
    /// Construction backtrace. Defaults to empty; builders fill it in.
    pub backtrace: Vec<TraceStep>,
}

impl SignalSpec {
    /// Starts a spec for an unsigned signal of the given width, reset to
    /// zero.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero.
    pub fn new(width: u32) -> Self {
        assert!(width > 0, "signal width must be positive");
        Self {
            width,
            signed: false,
            reset: Const::zero(width),
            name_override: None,
            backtrace: Vec::new(),
        }
    }

    /// Marks the signal as signed.
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Sets the reset value.
    pub fn reset(mut self, reset: Const) -> Self {
        self.reset = reset;
        self
    }

    /// Sets an explicit name override, used verbatim by the namer.
    pub fn named(mut self, name: &str) -> Self {
        self.name_override = Some(name.to_owned());
        self
    }

    /// Sets the construction backtrace.
    pub fn traced(mut self, backtrace: Vec<TraceStep>) -> Self {
        self.backtrace = backtrace;
        self
    }
}
