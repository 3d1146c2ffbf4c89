//! Fixed-point special lowering.
//!
//! Specials that expose a lowering rule are replaced by the fragment the
//! rule produces. Replacement fragments may themselves contain further
//! specials, lowerable or not, so the pass iterates to a fixed point: it
//! terminates
//! when no remaining special has an applicable rule, and fails with
//! [`LowerError::NonTerminatingLowering`] if the rule set keeps producing
//! work (a rule must not reintroduce its own kind).

use crate::error::LowerError;
use rivet_ir::{
    AsyncResetSync, Design, Fragment, Instance, InstanceConnection, Special, SpecialId,
    SpecialKind, SpecialTag, Value,
};
use std::collections::{BTreeMap, BTreeSet};

/// A target-specific lowering rule.
///
/// Returns the replacement fragment, or `None` to decline (the special
/// then passes through to the backend unchanged).
pub type LowerRule = fn(&Special, &mut Design, &Fragment) -> Option<Fragment>;

/// The explicit, inspectable table of lowering rules, keyed by kind.
#[derive(Default)]
pub struct LoweringRegistry {
    rules: BTreeMap<SpecialTag, LowerRule>,
}

impl LoweringRegistry {
    /// Creates an empty registry: every special passes through.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in rules.
    ///
    /// Currently that is the generic [`AsyncResetSync`] rule, which
    /// replaces the synchronizer with a two-flop synchronizer instance.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(SpecialTag::AsyncResetSync, lower_async_reset_sync);
        registry
    }

    /// Registers (or replaces) the rule for a kind.
    pub fn register(&mut self, tag: SpecialTag, rule: LowerRule) {
        self.rules.insert(tag, rule);
    }

    /// Looks up the rule for a kind.
    pub fn rule_for(&self, tag: SpecialTag) -> Option<LowerRule> {
        self.rules.get(&tag).copied()
    }

    /// Returns the kinds with registered rules, in tag order.
    pub fn registered_tags(&self) -> Vec<SpecialTag> {
        self.rules.keys().copied().collect()
    }
}

const MAX_ROUNDS: usize = 64;

/// Runs special lowering to its fixed point.
pub fn lower_specials(
    mut fragment: Fragment,
    design: &mut Design,
    registry: &LoweringRegistry,
) -> Result<Fragment, LowerError> {
    let mut pending: BTreeSet<SpecialId> = std::mem::take(&mut fragment.specials);
    let mut rounds = 0;
    loop {
        let mut progress = false;
        for id in pending.clone() {
            let special = design.special(id).clone();
            let Some(rule) = registry.rule_for(special.kind.tag()) else {
                continue;
            };
            if let Some(mut replacement) = rule(&special, design, &fragment) {
                pending.remove(&id);
                pending.extend(std::mem::take(&mut replacement.specials));
                fragment = fragment + replacement;
                progress = true;
            }
        }
        if !progress {
            break;
        }
        rounds += 1;
        if rounds > MAX_ROUNDS {
            return Err(LowerError::NonTerminatingLowering {
                rounds,
                pending: pending.len(),
            });
        }
    }
    fragment.specials = pending;
    Ok(fragment)
}

/// The generic reset-synchronizer rule: replaces the special with an
/// instance of a two-flop synchronizer driving the domain's reset.
///
/// Declines when the domain is unknown or reset-less, leaving the special
/// for a platform-specific rule or the backend to reject.
fn lower_async_reset_sync(
    special: &Special,
    design: &mut Design,
    fragment: &Fragment,
) -> Option<Fragment> {
    let SpecialKind::AsyncResetSync(AsyncResetSync { domain, trigger }) = &special.kind else {
        return None;
    };
    let cd = fragment.domain(domain)?;
    let rst = cd.reset?;
    let instance = design.add_special(SpecialKind::Instance(Instance {
        module: "rivet_reset_sync".into(),
        params: Vec::new(),
        connections: vec![
            InstanceConnection::Input {
                port: "clk".into(),
                value: Value::Signal(cd.clock),
            },
            InstanceConnection::Input {
                port: "arst".into(),
                value: trigger.clone(),
            },
            InstanceConnection::Output {
                port: "rst".into(),
                signal: rst,
            },
        ],
    }));
    let mut replacement = Fragment::new();
    replacement.specials.insert(instance);
    Some(replacement)
}
