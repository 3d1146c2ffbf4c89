//! Per-kind print routines for specials that survive lowering.
//!
//! The backend never inspects a special's payload itself: it looks the
//! kind up in the explicit [`PrintRegistry`] and delegates. A surviving
//! special with no routine is a fatal configuration error
//! ([`EmitError::UnprintableSpecial`](crate::EmitError::UnprintableSpecial)).

use crate::expr::{print_const, print_value};
use rivet_common::{InternalError, RivetResult};
use rivet_ir::{
    Design, Fragment, Instance, InstanceConnection, Memory, Special, SpecialKind, SpecialTag,
    Tristate,
};
use rivet_naming::NameTable;
use std::collections::BTreeMap;

/// A print routine producing the verbatim text of one special.
pub type PrintRoutine = fn(&Special, &Design, &Fragment, &mut NameTable) -> RivetResult<String>;

/// The explicit, inspectable table of print routines, keyed by kind.
#[derive(Default)]
pub struct PrintRegistry {
    routines: BTreeMap<SpecialTag, PrintRoutine>,
}

impl PrintRegistry {
    /// Creates an empty registry: every surviving special is unprintable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in routines for instances,
    /// tri-state buffers, and memories.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(SpecialTag::Instance, print_instance);
        registry.register(SpecialTag::Tristate, print_tristate);
        registry.register(SpecialTag::Memory, print_memory);
        registry
    }

    /// Registers (or replaces) the routine for a kind.
    pub fn register(&mut self, tag: SpecialTag, routine: PrintRoutine) {
        self.routines.insert(tag, routine);
    }

    /// Looks up the routine for a kind.
    pub fn routine_for(&self, tag: SpecialTag) -> Option<PrintRoutine> {
        self.routines.get(&tag).copied()
    }

    /// Returns the kinds with registered routines, in tag order.
    pub fn registered_tags(&self) -> Vec<SpecialTag> {
        self.routines.keys().copied().collect()
    }
}

fn print_instance(
    special: &Special,
    design: &Design,
    _fragment: &Fragment,
    table: &mut NameTable,
) -> RivetResult<String> {
    let SpecialKind::Instance(Instance {
        module,
        params,
        connections,
    }) = &special.kind
    else {
        return Err(InternalError::new("instance routine applied to non-instance"));
    };
    let label = table.fresh_aux(&module.to_lowercase());
    let mut out = String::new();
    out.push_str(module);
    if !params.is_empty() {
        out.push_str(" #(\n");
        let lines: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("\t.{name}({})", print_const(value)))
            .collect();
        out.push_str(&lines.join(",\n"));
        out.push_str("\n)");
    }
    out.push_str(&format!(" {label} (\n"));
    let mut lines = Vec::with_capacity(connections.len());
    for conn in connections {
        let line = match conn {
            InstanceConnection::Input { port, value } => {
                format!("\t.{port}({})", print_value(value, design, table)?)
            }
            InstanceConnection::Output { port, signal }
            | InstanceConnection::InOut { port, signal } => {
                format!("\t.{port}({})", table.get(*signal))
            }
        };
        lines.push(line);
    }
    out.push_str(&lines.join(",\n"));
    out.push_str("\n);\n");
    Ok(out)
}

fn print_tristate(
    special: &Special,
    design: &Design,
    _fragment: &Fragment,
    table: &mut NameTable,
) -> RivetResult<String> {
    let SpecialKind::Tristate(Tristate {
        target,
        output,
        output_enable,
        input,
    }) = &special.kind
    else {
        return Err(InternalError::new("tristate routine applied to non-tristate"));
    };
    let width = design.signal(*target).width;
    let high_z = if width > 1 {
        format!("{{{width}{{1'bz}}}}")
    } else {
        "1'bz".to_owned()
    };
    let mut out = format!(
        "assign {} = {} ? {} : {high_z};\n",
        table.get(*target),
        print_value(output_enable, design, table)?,
        print_value(output, design, table)?,
    );
    if let Some(input) = input {
        out.push_str(&format!(
            "assign {} = {};\n",
            table.get(*input),
            table.get(*target)
        ));
    }
    Ok(out)
}

fn print_memory(
    special: &Special,
    design: &Design,
    fragment: &Fragment,
    table: &mut NameTable,
) -> RivetResult<String> {
    let SpecialKind::Memory(Memory {
        name_hint,
        width,
        depth,
        init,
        ports,
    }) = &special.kind
    else {
        return Err(InternalError::new("memory routine applied to non-memory"));
    };
    let array = table.fresh_aux(name_hint);
    let range = if *width > 1 {
        format!("[{}:0] ", width - 1)
    } else {
        String::new()
    };
    let mut out = format!("reg {range}{array}[0:{}];\n", depth - 1);
    for port in ports {
        let domain = fragment.domain(&port.domain).ok_or_else(|| {
            InternalError::new(format!(
                "memory port references unknown clock domain `{}`",
                port.domain
            ))
        })?;
        let clock = table.get(domain.clock).to_owned();
        let address = print_value(&port.address, design, table)?;
        out.push_str(&format!("always @(posedge {clock}) begin\n"));
        if let (Some(enable), Some(data)) = (&port.write_enable, &port.data_write) {
            out.push_str(&format!(
                "\tif ({})\n\t\t{array}[{address}] <= {};\n",
                print_value(enable, design, table)?,
                print_value(data, design, table)?,
            ));
        }
        out.push_str(&format!(
            "\t{} <= {array}[{address}];\n",
            table.get(port.data_read)
        ));
        out.push_str("end\n");
    }
    if !init.is_empty() {
        out.push_str("initial begin\n");
        for (index, word) in init.iter().enumerate() {
            out.push_str(&format!("\t{array}[{index}] <= {};\n", print_const(word)));
        }
        out.push_str("end\n");
    }
    Ok(out)
}
