//! Reset injection.
//!
//! For every clock domain with a reset signal, the domain's entire
//! synchronous statement list is wrapped in a single conditional: on reset
//! assertion every written register takes its declared reset value,
//! otherwise the original statements run. Registers therefore initialize
//! correctly regardless of declaration order.

use rivet_ir::{written_signals, Design, Fragment, SignalId, Statement, Value};
use std::collections::BTreeSet;

/// Wraps each reset-capable domain's statements in its reset branch.
///
/// Idempotent: a list that already consists of exactly the domain's reset
/// conditional is left untouched.
pub fn insert_resets(fragment: &mut Fragment, design: &Design) {
    let domains = fragment.clock_domains.clone();
    for cd in domains {
        let Some(rst) = cd.reset else { continue };
        let Some(stmts) = fragment.sync.get_mut(&cd.name) else {
            continue;
        };
        if stmts.is_empty() || already_wrapped(stmts, rst) {
            continue;
        }
        let mut targets = BTreeSet::new();
        written_signals(stmts, &mut targets);
        let resets: Vec<Statement> = targets
            .iter()
            .map(|&sig| Statement::assign(sig, design.signal(sig).reset.clone()))
            .collect();
        let body = std::mem::take(stmts);
        stmts.push(Statement::If {
            condition: Value::Signal(rst),
            then_body: resets,
            else_body: body,
        });
    }
}

fn already_wrapped(stmts: &[Statement], rst: SignalId) -> bool {
    match stmts {
        [Statement::If {
            condition: Value::Signal(id),
            ..
        }] => *id == rst,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_ir::{ClockDomain, SignalSpec};
    use rivet_common::Const;

    fn fixture() -> (Design, Fragment, SignalId, SignalId) {
        let mut design = Design::new();
        let clk = design.add_signal(SignalSpec::new(1));
        let rst = design.add_signal(SignalSpec::new(1));
        let count = design.add_signal(SignalSpec::new(8).reset(Const::from_int(3)));
        let flag = design.add_signal(SignalSpec::new(1));
        let mut fragment = Fragment::new();
        fragment.add_domain(ClockDomain::new("sys", clk, rst));
        fragment.push_sync("sys", Statement::assign(flag, 1i64));
        fragment.push_sync(
            "sys",
            Statement::assign(count, Value::Signal(count) + 1i64),
        );
        (design, fragment, count, rst)
    }

    #[test]
    fn wraps_domain_in_reset_branch() {
        let (design, mut fragment, count, rst) = fixture();
        insert_resets(&mut fragment, &design);

        let stmts = &fragment.sync["sys"];
        assert_eq!(stmts.len(), 1);
        let Statement::If {
            condition,
            then_body,
            else_body,
        } = &stmts[0]
        else {
            panic!("expected reset conditional");
        };
        assert_eq!(*condition, Value::Signal(rst));
        // Both written targets are reset, in creation order.
        assert_eq!(then_body.len(), 2);
        let Statement::Assign { target, value } = &then_body[0] else {
            panic!("expected reset assignment");
        };
        assert_eq!(*target, Value::Signal(count));
        assert_eq!(*value, Value::Const(design.signal(count).reset.clone()));
        // Original statements preserved in the else branch.
        assert_eq!(else_body.len(), 2);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let (design, mut fragment, _, _) = fixture();
        insert_resets(&mut fragment, &design);
        let once = fragment.sync["sys"].clone();
        insert_resets(&mut fragment, &design);
        assert_eq!(fragment.sync["sys"], once);
        assert_eq!(fragment.sync["sys"].len(), 1);
    }

    #[test]
    fn reset_less_domain_is_untouched() {
        let mut design = Design::new();
        let clk = design.add_signal(SignalSpec::new(1));
        let q = design.add_signal(SignalSpec::new(4));
        let mut fragment = Fragment::new();
        fragment.add_domain(ClockDomain::reset_less("vid", clk));
        fragment.push_sync("vid", Statement::assign(q, 1i64));
        insert_resets(&mut fragment, &design);
        assert!(matches!(fragment.sync["vid"][0], Statement::Assign { .. }));
    }

    #[test]
    fn empty_sync_list_is_untouched() {
        let mut design = Design::new();
        let clk = design.add_signal(SignalSpec::new(1));
        let rst = design.add_signal(SignalSpec::new(1));
        let mut fragment = Fragment::new();
        fragment.add_domain(ClockDomain::new("sys", clk, rst));
        fragment.sync.insert("sys".into(), Vec::new());
        insert_resets(&mut fragment, &design);
        assert!(fragment.sync["sys"].is_empty());
    }
}
