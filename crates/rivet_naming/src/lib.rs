//! Flat-name computation for signals.
//!
//! The namer maps every live signal to a short, unique, stable identifier
//! derived only from its construction backtrace (never from a global
//! counter), so generated text stays reviewable. Explicit name overrides
//! bypass the computation and are used verbatim. Residual collisions (and
//! colliding overrides) are resolved with numeric suffixes assigned in
//! creation-id order, and every produced identifier is valid in the
//! target language (reserved words get a trailing underscore).
//!
//! Determinism: for a fixed signal set and creation order, two runs
//! produce identical assignments; no hash-map iteration order is ever
//! observable.

#![warn(missing_docs)]

mod hierarchy;

use hierarchy::PendingSignal;
use rivet_ir::{Design, SignalId};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// An error raised by the namer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Two signals ended up with the same flat name. This is an internal
    /// bug: the collision-resolution pass makes it unreachable.
    #[error("ambiguous flat name `{name}` assigned to more than one signal")]
    AmbiguousName {
        /// The duplicated name.
        name: String,
    },
}

/// Verilog-2005 reserved words that may never be emitted as identifiers.
const RESERVED: &[&str] = &[
    "always", "and", "assign", "begin", "buf", "case", "casex", "casez", "default", "defparam",
    "else", "end", "endcase", "endfunction", "endgenerate", "endmodule", "endtask", "for", "forever",
    "function", "generate", "genvar", "if", "initial", "inout", "input", "integer", "localparam",
    "module", "nand", "negedge", "nor", "not", "or", "output", "parameter", "posedge", "real",
    "reg", "repeat", "signed", "task", "time", "tri", "wand", "while", "wire", "wor", "xnor", "xor",
];

/// The computed signal-to-name table.
///
/// Built exactly once per compilation, after the last lowering pass, over
/// the set of signals still reachable. The backend may additionally
/// reserve auxiliary identifiers through [`fresh_aux`](Self::fresh_aux);
/// these never collide with signal names.
#[derive(Debug, Clone)]
pub struct NameTable {
    names: BTreeMap<SignalId, String>,
    used: BTreeSet<String>,
}

impl NameTable {
    /// Computes names for every signal in `live`.
    ///
    /// `name(a) == name(b)` implies `a == b`; a violation is reported as
    /// [`NameError::AmbiguousName`] and aborts the compilation.
    pub fn build(design: &Design, live: &BTreeSet<SignalId>) -> Result<NameTable, NameError> {
        let mut proposals: BTreeMap<SignalId, String> = BTreeMap::new();
        let mut pending = Vec::new();
        for &id in live {
            let sig = design.signal(id);
            match &sig.name_override {
                Some(name) => {
                    proposals.insert(id, name.clone());
                }
                None => pending.push(PendingSignal {
                    id,
                    trace: &sig.backtrace,
                }),
            }
        }
        for (id, base) in hierarchy::assign_base_names(pending) {
            proposals.insert(id, base);
        }

        // Resolve residual collisions in creation-id order: the earliest
        // signal keeps the base name, later ones get `_1`, `_2`, ...
        let mut used = BTreeSet::new();
        let mut names = BTreeMap::new();
        for (id, base) in proposals {
            let name = disambiguate(&sanitize(&base), &used);
            if !used.insert(name.clone()) {
                return Err(NameError::AmbiguousName { name });
            }
            names.insert(id, name);
        }
        Ok(NameTable { names, used })
    }

    /// Returns the flat name of a signal.
    ///
    /// # Panics
    ///
    /// Panics if the signal was not part of the live set the table was
    /// built over.
    pub fn get(&self, id: SignalId) -> &str {
        self.names
            .get(&id)
            .map(String::as_str)
            .expect("signal was not named; not part of the live set")
    }

    /// Returns the flat name of a signal, if it was named.
    pub fn try_get(&self, id: SignalId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Reserves a fresh auxiliary identifier derived from `base`, distinct
    /// from every signal name and every previously reserved identifier.
    pub fn fresh_aux(&mut self, base: &str) -> String {
        let name = disambiguate(&sanitize(base), &self.used);
        self.used.insert(name.clone());
        name
    }

    /// Iterates over `(signal, name)` pairs in creation-id order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Returns the number of named signals.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no signal was named.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        out.push_str("sig");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if RESERVED.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

fn disambiguate(base: &str, used: &BTreeSet<String>) -> String {
    if !used.contains(base) {
        return base.to_owned();
    }
    let mut index = 1u32;
    loop {
        let candidate = format!("{base}_{index}");
        if !used.contains(&candidate) {
            return candidate;
        }
        index += 1;
    }
}
