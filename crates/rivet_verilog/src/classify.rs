//! Signal classification.
//!
//! Every live signal prints as exactly one of: a *port* (member of the
//! caller-supplied I/O set), a *wire* (exactly one unconditional
//! whole-signal combinational driver, or driven by a special/undriven),
//! or a *register* (driven synchronously, driven inside a combinational
//! always-block, or synchronously read out of a memory).

use rivet_ir::{written_signals, Design, Fragment, SignalId, SpecialKind, Statement, Value};
use std::collections::BTreeSet;

/// Port direction, derived from how the fragment drives the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Read by the fragment, never driven.
    Input,
    /// Driven by the fragment or a special.
    Output,
    /// Targeted by a tri-state buffer.
    InOut,
}

/// One group of combinational statements sharing (transitively
/// overlapping) target sets, printed as a single always-block.
#[derive(Debug, Clone)]
pub struct CombGroup {
    /// Every signal the group writes.
    pub targets: BTreeSet<SignalId>,
    /// The statements, in original order.
    pub stmts: Vec<Statement>,
}

/// The complete classification of a lowered fragment.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Ports in ascending creation-id order, with derived directions.
    pub ports: Vec<(SignalId, Direction)>,
    /// Signals declared `reg`.
    pub registers: BTreeSet<SignalId>,
    /// Single-driver combinational assignments, printed as `assign`.
    pub wire_assigns: Vec<(SignalId, Value)>,
    /// Combinational always-block groups, in first-statement order.
    pub comb_groups: Vec<CombGroup>,
}

/// Classifies every signal of the fragment.
pub fn classify(design: &Design, fragment: &Fragment, ios: &[SignalId]) -> Classification {
    let mut sync_targets = BTreeSet::new();
    for stmts in fragment.sync.values() {
        written_signals(stmts, &mut sync_targets);
    }

    let mut special_driven = BTreeSet::new();
    let mut memory_read = BTreeSet::new();
    let mut tristate_targets = BTreeSet::new();
    for &id in &fragment.specials {
        let kind = &design.special(id).kind;
        kind.driven_signals(&mut special_driven);
        match kind {
            SpecialKind::Memory(mem) => {
                for port in &mem.ports {
                    memory_read.insert(port.data_read);
                }
            }
            SpecialKind::Tristate(tri) => {
                tristate_targets.insert(tri.target);
            }
            _ => {}
        }
    }

    let groups = group_by_targets(&fragment.comb);

    // A group collapses to an `assign` only if it is a lone whole-signal
    // assignment whose target has no other driver.
    let mut wire_assigns = Vec::new();
    let mut comb_groups = Vec::new();
    let mut registers: BTreeSet<SignalId> = sync_targets.clone();
    registers.extend(memory_read.iter().copied());
    for group in groups {
        let lone_assign = match group.stmts.as_slice() {
            [Statement::Assign {
                target: Value::Signal(id),
                value,
            }] => Some((*id, value.clone())),
            _ => None,
        };
        match lone_assign {
            Some((id, value))
                if !sync_targets.contains(&id) && !special_driven.contains(&id) =>
            {
                wire_assigns.push((id, value));
            }
            _ => {
                registers.extend(group.targets.iter().copied());
                comb_groups.push(group);
            }
        }
    }

    let mut driven: BTreeSet<SignalId> = registers.clone();
    driven.extend(wire_assigns.iter().map(|(id, _)| *id));
    driven.extend(special_driven.iter().copied());

    let mut ports: Vec<SignalId> = ios.to_vec();
    ports.sort();
    ports.dedup();
    let ports = ports
        .into_iter()
        .map(|id| {
            let direction = if tristate_targets.contains(&id) {
                Direction::InOut
            } else if driven.contains(&id) {
                Direction::Output
            } else {
                Direction::Input
            };
            (id, direction)
        })
        .collect();

    Classification {
        ports,
        registers,
        wire_assigns,
        comb_groups,
    }
}

/// Groups combinational statements whose target sets transitively
/// overlap, preserving statement order within each group.
fn group_by_targets(comb: &[Statement]) -> Vec<CombGroup> {
    let mut groups: Vec<CombGroup> = Vec::new();
    for stmt in comb {
        let mut targets = BTreeSet::new();
        written_signals(std::slice::from_ref(stmt), &mut targets);

        let overlapping: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.targets.is_disjoint(&targets))
            .map(|(i, _)| i)
            .collect();

        match overlapping.split_first() {
            None => groups.push(CombGroup {
                targets,
                stmts: vec![stmt.clone()],
            }),
            Some((&first, rest)) => {
                // Merge every overlapping group into the earliest one.
                for &i in rest.iter().rev() {
                    let absorbed = groups.remove(i);
                    groups[first].targets.extend(absorbed.targets);
                    groups[first].stmts.extend(absorbed.stmts);
                }
                groups[first].targets.extend(targets);
                groups[first].stmts.push(stmt.clone());
            }
        }
    }
    groups
}
