//! Statement printing inside always-blocks.

use crate::expr::{print_const, print_value};
use rivet_common::RivetResult;
use rivet_ir::{Design, Statement};
use rivet_naming::NameTable;

/// Prints a statement list at the given indentation depth (in tabs).
pub(crate) fn print_stmts(
    stmts: &[Statement],
    indent: usize,
    design: &Design,
    table: &NameTable,
) -> RivetResult<String> {
    let mut out = String::new();
    for stmt in stmts {
        out.push_str(&print_stmt(stmt, indent, design, table)?);
    }
    Ok(out)
}

fn print_stmt(
    stmt: &Statement,
    indent: usize,
    design: &Design,
    table: &NameTable,
) -> RivetResult<String> {
    let tabs = "\t".repeat(indent);
    match stmt {
        Statement::Assign { target, value } => {
            let t = print_value(target, design, table)?;
            let v = print_value(value, design, table)?;
            Ok(format!("{tabs}{t} <= {v};\n"))
        }
        Statement::If {
            condition,
            then_body,
            else_body,
        } => {
            let c = print_value(condition, design, table)?;
            let mut out = format!("{tabs}if ({c}) begin\n");
            out.push_str(&print_stmts(then_body, indent + 1, design, table)?);
            if else_body.is_empty() {
                out.push_str(&format!("{tabs}end\n"));
            } else {
                out.push_str(&format!("{tabs}end else begin\n"));
                out.push_str(&print_stmts(else_body, indent + 1, design, table)?);
                out.push_str(&format!("{tabs}end\n"));
            }
            Ok(out)
        }
        Statement::Case {
            selector,
            arms,
            default,
        } => {
            let s = print_value(selector, design, table)?;
            let mut out = format!("{tabs}case ({s})\n");
            for arm in arms {
                out.push_str(&format!("{tabs}\t{}: begin\n", print_const(&arm.value)));
                out.push_str(&print_stmts(&arm.body, indent + 2, design, table)?);
                out.push_str(&format!("{tabs}\tend\n"));
            }
            if let Some(default) = default {
                out.push_str(&format!("{tabs}\tdefault: begin\n"));
                out.push_str(&print_stmts(default, indent + 2, design, table)?);
                out.push_str(&format!("{tabs}\tend\n"));
            }
            out.push_str(&format!("{tabs}endcase\n"));
            Ok(out)
        }
    }
}
