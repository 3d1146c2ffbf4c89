//! The recursive backtrace-binning pass.
//!
//! Works depth-wise over the signals' construction backtraces: at each
//! depth, signals are binned by the raw name their current step presents.
//! A bin whose members come from different owner objects with the same
//! type name is split per owner with a type-derived prefix; bins whose
//! recursion results would collide with a sibling's are prefixed with the
//! bin's own name. Prefixes are only ever added when needed, keeping the
//! flat names short.

use rivet_ir::{SignalId, TraceContext, TraceStep};
use std::collections::{BTreeMap, BTreeSet};

/// A signal awaiting a computed base name.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingSignal<'a> {
    /// The signal.
    pub id: SignalId,
    /// Its backtrace, outermost step first.
    pub trace: &'a [TraceStep],
}

/// The base name used for signals with no backtrace at all.
const ANONYMOUS: &str = "sig";

/// Computes a base name for every pending signal.
///
/// The returned names are not yet guaranteed unique; the caller resolves
/// residual collisions with numeric suffixes. Input order must be
/// creation-id order, which the algorithm preserves as its tie-break
/// everywhere, making the result deterministic.
pub(crate) fn assign_base_names(pending: Vec<PendingSignal<'_>>) -> Vec<(SignalId, String)> {
    name_level(&pending, 0)
}

fn name_level(entries: &[PendingSignal<'_>], depth: usize) -> Vec<(SignalId, String)> {
    let mut results = Vec::new();

    // Bin by the raw step name presented at this depth.
    let mut bins: BTreeMap<String, Vec<PendingSignal<'_>>> = BTreeMap::new();
    for entry in entries {
        match entry.trace.get(depth) {
            None => results.push((entry.id, ANONYMOUS.to_owned())),
            Some(step) => bins.entry(step.raw_name()).or_default().push(*entry),
        }
    }

    // Split bins whose members come from duck-colliding contexts.
    let mut outcomes = Vec::new();
    for (raw, members) in bins {
        for (base, group) in split_contexts(&raw, members, depth) {
            outcomes.push(resolve_bin(base, group, depth));
        }
    }

    // A bin's recursion results are prefixed with the bin's own name only
    // if they collide with some sibling's candidates.
    let mut needs_prefix = vec![false; outcomes.len()];
    for i in 0..outcomes.len() {
        for j in (i + 1)..outcomes.len() {
            if !outcomes[i].candidates.is_disjoint(&outcomes[j].candidates) {
                needs_prefix[i] = true;
                needs_prefix[j] = true;
            }
        }
    }

    for (outcome, prefixed) in outcomes.into_iter().zip(needs_prefix) {
        for id in outcome.terminal_ids {
            results.push((id, outcome.base.clone()));
        }
        for (id, child) in outcome.child_names {
            let name = if prefixed {
                format!("{}_{child}", outcome.base)
            } else {
                child
            };
            results.push((id, name));
        }
    }
    results
}

struct BinOutcome {
    base: String,
    terminal_ids: Vec<SignalId>,
    child_names: Vec<(SignalId, String)>,
    candidates: BTreeSet<String>,
}

fn resolve_bin(base: String, members: Vec<PendingSignal<'_>>, depth: usize) -> BinOutcome {
    let mut terminal_ids = Vec::new();
    let mut deeper = Vec::new();
    for member in members {
        if depth + 1 == member.trace.len() {
            terminal_ids.push(member.id);
        } else {
            deeper.push(member);
        }
    }
    let child_names = if deeper.is_empty() {
        Vec::new()
    } else {
        name_level(&deeper, depth + 1)
    };
    let mut candidates: BTreeSet<String> =
        child_names.iter().map(|(_, name)| name.clone()).collect();
    if !terminal_ids.is_empty() {
        candidates.insert(base.clone());
    }
    BinOutcome {
        base,
        terminal_ids,
        child_names,
        candidates,
    }
}

/// Splits a raw-name bin per owner context when two different owners with
/// the same type name contributed to it.
///
/// Without such a duck-typed collision the raw name is kept as-is. With
/// one, every context sub-group gets a `<typename><index>_` prefix, the
/// index assigned the first time a distinct owner of that type is seen
/// (members arrive in creation order, so indices are deterministic).
fn split_contexts<'a>(
    raw: &str,
    members: Vec<PendingSignal<'a>>,
    depth: usize,
) -> Vec<(String, Vec<PendingSignal<'a>>)> {
    let mut contexts: Vec<&TraceContext> = Vec::new();
    for member in &members {
        let ctx = &member.trace[depth].context;
        if !contexts.iter().any(|c| *c == ctx) {
            contexts.push(ctx);
        }
    }

    let duck_collision = contexts.iter().enumerate().any(|(i, a)| {
        contexts[i + 1..]
            .iter()
            .any(|b| context_type_name(a) == context_type_name(b))
    });
    if !duck_collision {
        return vec![(raw.to_owned(), members)];
    }

    let mut indices: BTreeMap<String, u32> = BTreeMap::new();
    let mut out = Vec::new();
    for ctx in contexts {
        let type_name = context_type_name(ctx);
        let index = indices.entry(type_name.clone()).or_insert(0);
        let base = format!("{}{}_{raw}", type_name.to_lowercase(), index);
        *index += 1;
        let group: Vec<PendingSignal<'a>> = members
            .iter()
            .copied()
            .filter(|m| m.trace[depth].context == *ctx)
            .collect();
        out.push((base, group));
    }
    out
}

fn context_type_name(ctx: &TraceContext) -> String {
    match ctx {
        TraceContext::Label(label) => label.clone(),
        TraceContext::Object { type_name, .. } => type_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_ir::EntityId;

    fn step(type_name: &str, instance: u32, name: Option<&str>) -> TraceStep {
        TraceStep::new(
            TraceContext::Object {
                type_name: type_name.into(),
                instance,
            },
            name,
        )
    }

    fn names_of(traces: Vec<Vec<TraceStep>>) -> Vec<String> {
        let pending: Vec<PendingSignal> = traces
            .iter()
            .enumerate()
            .map(|(i, trace)| PendingSignal {
                id: SignalId::from_raw(i as u32),
                trace,
            })
            .collect();
        let mut assigned = assign_base_names(pending);
        assigned.sort_by_key(|(id, _)| *id);
        assigned.into_iter().map(|(_, name)| name).collect()
    }

    #[test]
    fn lone_signals_keep_raw_names() {
        let names = names_of(vec![
            vec![step("Top", 0, Some("ready"))],
            vec![step("Top", 0, Some("valid"))],
        ]);
        assert_eq!(names, vec!["ready", "valid"]);
    }

    #[test]
    fn single_child_is_not_prefixed() {
        let names = names_of(vec![
            vec![step("Top", 0, Some("sub")), step("Leaf", 1, Some("x"))],
            vec![step("Top", 0, Some("sub")), step("Leaf", 1, Some("y"))],
        ]);
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn overlapping_sibling_bins_are_prefixed() {
        let names = names_of(vec![
            vec![step("Top", 0, Some("a")), step("Leaf", 1, Some("x"))],
            vec![step("Top", 0, Some("b")), step("Leaf", 2, Some("x"))],
        ]);
        assert_eq!(names, vec!["a_x", "b_x"]);
    }

    #[test]
    fn disjoint_sibling_bins_stay_short() {
        let names = names_of(vec![
            vec![step("Top", 0, Some("a")), step("Leaf", 1, Some("x"))],
            vec![step("Top", 0, Some("b")), step("Leaf", 2, Some("y"))],
        ]);
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn duck_typed_collision_gets_type_indexed_prefix() {
        // Two different Counter objects both present the terminal name
        // "count" at the same depth.
        let names = names_of(vec![
            vec![step("Counter", 0, Some("count"))],
            vec![step("Counter", 1, Some("count"))],
        ]);
        assert_eq!(names, vec!["counter0_count", "counter1_count"]);
    }

    #[test]
    fn same_context_is_not_a_duck_collision() {
        // The same object declaring two signals of different names.
        let names = names_of(vec![
            vec![step("Counter", 0, Some("count"))],
            vec![step("Counter", 0, Some("carry"))],
        ]);
        assert_eq!(names, vec!["count", "carry"]);
    }

    #[test]
    fn terminal_base_collides_with_child_name() {
        // A terminal "x" next to a subtree that also produces "x".
        let names = names_of(vec![
            vec![step("Top", 0, Some("x"))],
            vec![step("Top", 0, Some("sub")), step("Leaf", 1, Some("x"))],
        ]);
        assert_eq!(names, vec!["x", "sub_x"]);
    }

    #[test]
    fn missing_step_name_falls_back_to_context() {
        let names = names_of(vec![vec![step("Uart", 0, None)]]);
        assert_eq!(names, vec!["uart"]);
    }

    #[test]
    fn empty_trace_is_anonymous() {
        let names = names_of(vec![Vec::new()]);
        assert_eq!(names, vec!["sig"]);
    }
}
