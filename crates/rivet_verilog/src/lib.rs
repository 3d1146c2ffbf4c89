//! The Verilog emission backend.
//!
//! Walks a fully lowered [`Fragment`] plus the computed name table and
//! prints a single self-contained, synthesizable module: ports in
//! creation-id order, one `assign` per wire-classified target, one
//! `always @(*)` block per combinational target group, one
//! `always @(posedge ...)` block per used clock domain, verbatim specials
//! through the print registry, and a trailing `initial` block giving every
//! internal register its reset value. The backend is read-only over the
//! fragment; identical inputs produce byte-identical text.

#![warn(missing_docs)]

pub mod classify;
pub mod error;
mod expr;
mod printer;
pub mod specials;

pub use classify::{classify, Classification, CombGroup, Direction};
pub use error::EmitError;
pub use specials::{PrintRegistry, PrintRoutine};

use rivet_common::InternalError;
use rivet_ir::{Design, EntityId, Fragment, SignalId};
use rivet_naming::NameTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Emission configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// The emitted module's name.
    pub module_name: String,
    /// Instrument combinational always-blocks with an auxiliary toggle
    /// register so event-driven simulators evaluate them at time zero.
    pub simulation_kick: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            module_name: "top".to_owned(),
            simulation_kick: true,
        }
    }
}

/// Collects the signals reachable from the fragment and the I/O set:
/// the set the [`NameTable`] must be built over.
pub fn live_signals(design: &Design, fragment: &Fragment, ios: &[SignalId]) -> BTreeSet<SignalId> {
    let mut live = fragment.written_signals();
    live.extend(fragment.read_signals());
    for &id in &fragment.specials {
        design.special(id).kind.referenced_signals(&mut live);
    }
    live.extend(ios.iter().copied());
    live
}

/// Emits the complete module text.
///
/// `table` must have been built over [`live_signals`] of the same
/// fragment; it is only mutated to reserve auxiliary identifiers (comb
/// instrumentation, instance labels, memory arrays).
pub fn emit(
    design: &Design,
    fragment: &Fragment,
    ios: &[SignalId],
    table: &mut NameTable,
    registry: &PrintRegistry,
    config: &EmitConfig,
) -> Result<String, EmitError> {
    let classification = classify(design, fragment, ios);
    let port_ids: BTreeSet<SignalId> = classification.ports.iter().map(|(id, _)| *id).collect();
    let live = live_signals(design, fragment, ios);

    let mut out = String::new();
    out.push_str("/* Machine-generated using Rivet */\n");
    out.push_str(&format!("module {}(\n", config.module_name));
    let port_lines: Vec<String> = classification
        .ports
        .iter()
        .map(|(id, direction)| {
            let keyword = match direction {
                Direction::Input => "input",
                Direction::Output => "output",
                Direction::InOut => "inout",
            };
            let reg = *direction == Direction::Output && classification.registers.contains(id);
            format!(
                "\t{keyword} {}{}",
                if reg { "reg " } else { "" },
                declaration(design, *id, table)
            )
        })
        .collect();
    out.push_str(&port_lines.join(",\n"));
    out.push_str("\n);\n\n");

    // Internal declarations, in creation-id order.
    let mut declared_any = false;
    for &id in &live {
        if port_ids.contains(&id) {
            continue;
        }
        let kind = if classification.registers.contains(&id) {
            "reg"
        } else {
            "wire"
        };
        out.push_str(&format!("{kind} {};\n", declaration(design, id, table)));
        declared_any = true;
    }
    if declared_any {
        out.push('\n');
    }

    for (id, value) in &classification.wire_assigns {
        out.push_str(&format!(
            "assign {} = {};\n",
            table.get(*id),
            expr::print_value(value, design, table).map_err(EmitError::Internal)?
        ));
    }
    if !classification.wire_assigns.is_empty() {
        out.push('\n');
    }

    let kick = if !classification.comb_groups.is_empty() && config.simulation_kick {
        let kick = table.fresh_aux("sim_kick");
        out.push_str("// synthesis translate_off\n");
        out.push_str(&format!("reg {kick};\ninitial {kick} <= 1'd0;\n"));
        out.push_str("// synthesis translate_on\n\n");
        Some(kick)
    } else {
        None
    };
    for group in &classification.comb_groups {
        let ack = kick.as_ref().map(|_| table.fresh_aux("sim_ack"));
        if let Some(ack) = &ack {
            out.push_str("// synthesis translate_off\n");
            out.push_str(&format!("reg {ack};\n"));
            out.push_str("// synthesis translate_on\n");
        }
        out.push_str("always @(*) begin\n");
        out.push_str(&printer::print_stmts(&group.stmts, 1, design, table)?);
        if let (Some(kick), Some(ack)) = (&kick, &ack) {
            out.push_str("// synthesis translate_off\n");
            out.push_str(&format!("\t{ack} = {kick};\n"));
            out.push_str("// synthesis translate_on\n");
        }
        out.push_str("end\n\n");
    }

    // One always-block per used clock domain, in name order.
    for (name, stmts) in &fragment.sync {
        if stmts.is_empty() {
            continue;
        }
        let domain = fragment.domain(name.as_str()).ok_or_else(|| {
            InternalError::new(format!(
                "synchronous statements in unresolved clock domain `{name}`"
            ))
        })?;
        out.push_str(&format!(
            "always @(posedge {}) begin\n",
            table.get(domain.clock)
        ));
        out.push_str(&printer::print_stmts(stmts, 1, design, table)?);
        out.push_str("end\n\n");
    }

    // Surviving specials, in creation-id order.
    for &id in &fragment.specials {
        let special = design.special(id);
        let routine = registry.routine_for(special.kind.tag()).ok_or(
            EmitError::UnprintableSpecial {
                id: id.as_raw(),
                kind: special.kind.tag(),
            },
        )?;
        out.push_str(&routine(special, design, fragment, table)?);
        out.push('\n');
    }

    // Reset values for every internal register, in creation-id order.
    let init_regs: Vec<SignalId> = classification
        .registers
        .iter()
        .filter(|id| !port_ids.contains(id))
        .copied()
        .collect();
    if !init_regs.is_empty() {
        out.push_str("initial begin\n");
        for id in init_regs {
            out.push_str(&format!(
                "\t{} <= {};\n",
                table.get(id),
                expr::print_const(&design.signal(id).reset)
            ));
        }
        out.push_str("end\n\n");
    }

    out.push_str("endmodule\n");
    Ok(out)
}

fn declaration(design: &Design, id: SignalId, table: &NameTable) -> String {
    let sig = design.signal(id);
    let mut out = String::new();
    if sig.signed {
        out.push_str("signed ");
    }
    if sig.width > 1 {
        out.push_str(&format!("[{}:0] ", sig.width - 1));
    }
    out.push_str(table.get(id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_ir::{ClockDomain, SignalSpec, Statement, Value};

    fn emit_fragment(
        design: &Design,
        fragment: &Fragment,
        ios: &[SignalId],
        config: &EmitConfig,
    ) -> Result<String, EmitError> {
        let live = live_signals(design, fragment, ios);
        let mut table = NameTable::build(design, &live).unwrap();
        emit(
            design,
            fragment,
            ios,
            &mut table,
            &PrintRegistry::with_builtins(),
            config,
        )
    }

    #[test]
    fn wire_only_module() {
        let mut design = Design::new();
        let a = design.add_signal(SignalSpec::new(8).named("a"));
        let y = design.add_signal(SignalSpec::new(8).named("y"));
        let mut fragment = Fragment::new();
        fragment.push_comb(Statement::assign(y, Value::Signal(a)));

        let text = emit_fragment(&design, &fragment, &[a, y], &EmitConfig::default()).unwrap();
        assert!(text.contains("module top(\n\tinput [7:0] a,\n\toutput [7:0] y\n);\n"));
        assert!(text.contains("assign y = a;\n"));
        assert!(!text.contains("always"));
        assert!(text.ends_with("endmodule\n"));
    }

    #[test]
    fn sync_block_prints_posedge_and_initial() {
        let mut design = Design::new();
        let clk = design.add_signal(SignalSpec::new(1).named("sys_clk"));
        let q = design.add_signal(SignalSpec::new(4).named("q"));
        let mut fragment = Fragment::new();
        fragment.add_domain(ClockDomain::reset_less("sys", clk));
        fragment.push_sync("sys", Statement::assign(q, Value::Signal(q) + 1i64));

        let text = emit_fragment(&design, &fragment, &[clk], &EmitConfig::default()).unwrap();
        assert!(text.contains("always @(posedge sys_clk) begin\n"));
        assert!(text.contains("\tq <= (q + 1'd1);\n"));
        // Internal register gets declared and initialized.
        assert!(text.contains("reg [3:0] q;\n"));
        assert!(text.contains("initial begin\n\tq <= 4'd0;\nend\n"));
    }

    #[test]
    fn comb_group_gets_simulation_kick() {
        let mut design = Design::new();
        let sel = design.add_signal(SignalSpec::new(1).named("sel"));
        let y = design.add_signal(SignalSpec::new(1).named("y"));
        let mut fragment = Fragment::new();
        fragment.push_comb(Statement::assign(y, 0i64));
        fragment.push_comb(Statement::when(
            Value::Signal(sel),
            vec![Statement::assign(y, 1i64)],
        ));

        let text = emit_fragment(&design, &fragment, &[sel], &EmitConfig::default()).unwrap();
        assert!(text.contains("reg sim_kick;\ninitial sim_kick <= 1'd0;\n"));
        assert!(text.contains("always @(*) begin\n"));
        assert!(text.contains("\tsim_ack = sim_kick;\n"));
    }

    #[test]
    fn kick_can_be_disabled() {
        let mut design = Design::new();
        let sel = design.add_signal(SignalSpec::new(1).named("sel"));
        let y = design.add_signal(SignalSpec::new(1).named("y"));
        let mut fragment = Fragment::new();
        fragment.push_comb(Statement::when(
            Value::Signal(sel),
            vec![Statement::assign(y, 1i64)],
        ));

        let config = EmitConfig {
            simulation_kick: false,
            ..EmitConfig::default()
        };
        let text = emit_fragment(&design, &fragment, &[], &config).unwrap();
        assert!(!text.contains("sim_kick"));
    }

    #[test]
    fn output_register_port_is_tagged_reg() {
        let mut design = Design::new();
        let clk = design.add_signal(SignalSpec::new(1).named("clk"));
        let q = design.add_signal(SignalSpec::new(8).named("q"));
        let mut fragment = Fragment::new();
        fragment.add_domain(ClockDomain::reset_less("sys", clk));
        fragment.push_sync("sys", Statement::assign(q, 1i64));

        let text = emit_fragment(&design, &fragment, &[clk, q], &EmitConfig::default()).unwrap();
        assert!(text.contains("\toutput reg [7:0] q\n"));
        // Ports are not re-initialized in the trailing initial block.
        assert!(!text.contains("initial begin\n\tq"));
    }

    #[test]
    fn surviving_special_without_routine_is_fatal() {
        let mut design = Design::new();
        let trigger = design.add_signal(SignalSpec::new(1));
        let id = design.add_special(rivet_ir::SpecialKind::AsyncResetSync(
            rivet_ir::AsyncResetSync {
                domain: "sys".into(),
                trigger: Value::Signal(trigger),
            },
        ));
        let mut fragment = Fragment::new();
        fragment.specials.insert(id);

        let err = emit_fragment(&design, &fragment, &[], &EmitConfig::default()).unwrap_err();
        assert!(matches!(err, EmitError::UnprintableSpecial { .. }));
    }

    #[test]
    fn signed_signals_declare_signed() {
        let mut design = Design::new();
        let x = design.add_signal(SignalSpec::new(8).signed().named("x"));
        let y = design.add_signal(SignalSpec::new(8).signed().named("y"));
        let mut fragment = Fragment::new();
        fragment.push_comb(Statement::assign(y, Value::Signal(x)));

        let text = emit_fragment(&design, &fragment, &[x, y], &EmitConfig::default()).unwrap();
        assert!(text.contains("\tinput signed [7:0] x,\n"));
        assert!(text.contains("\toutput signed [7:0] y\n"));
    }

    #[test]
    fn emission_is_deterministic() {
        let build = || {
            let mut design = Design::new();
            let clk = design.add_signal(SignalSpec::new(1).named("clk"));
            let q = design.add_signal(SignalSpec::new(8).named("q"));
            let mut fragment = Fragment::new();
            fragment.add_domain(ClockDomain::reset_less("sys", clk));
            fragment.push_sync("sys", Statement::assign(q, Value::Signal(q) + 1i64));
            emit_fragment(&design, &fragment, &[clk, q], &EmitConfig::default()).unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn config_parses_from_toml() {
        let config: EmitConfig = toml::from_str(
            r#"
            module_name = "soc_core"
            "#,
        )
        .unwrap();
        assert_eq!(config.module_name, "soc_core");
        assert!(config.simulation_kick);
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = EmitConfig {
            module_name: "dut".into(),
            simulation_kick: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: EmitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
