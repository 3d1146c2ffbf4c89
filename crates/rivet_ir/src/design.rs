//! The per-compilation entity arena.
//!
//! A [`Design`] owns every signal and special created during one
//! compilation and hands out their sequential creation ids. Its lifetime is
//! scoped to a single run; there is no process-wide state.

use crate::arena::Arena;
use crate::signal::{Signal, SignalId, SignalSpec};
use crate::special::{Special, SpecialId, SpecialKind};
use rivet_common::Const;
use serde::{Deserialize, Serialize};

/// The per-compilation container of signals and specials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    signals: Arena<SignalId, Signal>,
    specials: Arena<SpecialId, Special>,
    next_instance: u32,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signal from a spec and returns its ID.
    ///
    /// The reset value is rewrapped to the signal's width and signedness,
    /// so the stored reset always matches the signal's own shape.
    pub fn add_signal(&mut self, spec: SignalSpec) -> SignalId {
        let id = self.signals.next_id();
        let reset = Const::new(spec.reset.value().clone(), spec.width, spec.signed);
        self.signals.insert(Signal {
            id,
            width: spec.width,
            signed: spec.signed,
            reset,
            name_override: spec.name_override,
            backtrace: spec.backtrace,
        })
    }

    /// Returns the signal with the given ID.
    pub fn signal(&self, id: SignalId) -> &Signal {
        self.signals.get(id)
    }

    /// Iterates over all signals in creation order.
    pub fn signals(&self) -> impl Iterator<Item = (SignalId, &Signal)> {
        self.signals.iter()
    }

    /// Returns the number of signals created so far.
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Creates a special and returns its ID.
    pub fn add_special(&mut self, kind: SpecialKind) -> SpecialId {
        let id = self.specials.next_id();
        self.specials.insert(Special { id, kind })
    }

    /// Returns the special with the given ID.
    pub fn special(&self, id: SpecialId) -> &Special {
        self.specials.get(id)
    }

    /// Hands out the next builder instance number, used to distinguish
    /// same-typed owners in construction backtraces.
    pub fn next_instance_number(&mut self) -> u32 {
        let n = self.next_instance;
        self.next_instance += 1;
        n
    }
}
