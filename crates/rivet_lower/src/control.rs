//! Control-statement canonicalization.
//!
//! A combinational target written only inside some branches of an
//! `If`/`Case` would infer a latch. This pass gives every such target a
//! well-defined value on every path: a default assignment to the target's
//! reset value is inserted before the conditional, so later conditional
//! writes override it ("last applicable write wins").

use rivet_ir::{written_signals, Design, Fragment, Statement, Value};
use std::collections::BTreeSet;

/// Defaults every conditionally driven combinational target.
///
/// Idempotent: inserted defaults are unconditional whole-signal
/// assignments, which a second run recognizes as already-covered targets.
pub fn canonicalize_comb(fragment: &mut Fragment, design: &Design) {
    let stmts = std::mem::take(&mut fragment.comb);
    let mut covered = BTreeSet::new();
    let mut result = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        match &stmt {
            // A whole-signal unconditional assignment covers its target.
            Statement::Assign {
                target: Value::Signal(id),
                ..
            } => {
                covered.insert(*id);
            }
            _ => {
                // Conditional or partial writes need a default first.
                let mut targets = BTreeSet::new();
                written_signals(std::slice::from_ref(&stmt), &mut targets);
                for sig in targets {
                    if covered.insert(sig) {
                        result.push(Statement::assign(sig, design.signal(sig).reset.clone()));
                    }
                }
            }
        }
        result.push(stmt);
    }
    fragment.comb = result;
}
