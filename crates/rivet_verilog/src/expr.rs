//! Expression printing.
//!
//! Every composite expression prints fully parenthesized, so operator
//! precedence never depends on the target language. Verilog treats a whole
//! expression as unsigned as soon as any operand is unsigned, which would
//! silently break signed arithmetic; wherever a signed and an unsigned
//! operand meet in a value-affecting operator, the unsigned operand is
//! rewrapped with an explicit one-bit zero extension (`$signed({1'd0, x})`).

use num_traits::Signed;
use rivet_common::{Const, InternalError, RivetResult};
use rivet_ir::{BinaryOp, Design, Shape, UnaryOp, Value};
use rivet_naming::NameTable;

/// Prints a constant at its stored width with an explicit base tag.
pub(crate) fn print_const(value: &Const) -> String {
    let width = value.width();
    if value.signed() {
        if value.value().is_negative() {
            format!("-{width}'sd{}", value.value().abs())
        } else {
            format!("{width}'sd{}", value.value())
        }
    } else {
        format!("{width}'d{}", value.value())
    }
}

/// Prints a value as a Verilog expression.
pub(crate) fn print_value(
    value: &Value,
    design: &Design,
    table: &NameTable,
) -> RivetResult<String> {
    match value {
        Value::Signal(id) => Ok(table.get(*id).to_owned()),
        Value::Const(c) => Ok(print_const(c)),
        Value::Unary { op, operand } => {
            let inner = print_value(operand, design, table)?;
            let symbol = match op {
                UnaryOp::Not => "~",
                UnaryOp::Neg => "-",
            };
            Ok(format!("({symbol}{inner})"))
        }
        Value::Binary { op, lhs, rhs } => print_binary(*op, lhs, rhs, design, table),
        Value::Mux {
            cond,
            if_true,
            if_false,
        } => {
            let c = print_value(cond, design, table)?;
            let t = print_value(if_true, design, table)?;
            let f = print_value(if_false, design, table)?;
            Ok(format!("({c} ? {t} : {f})"))
        }
        Value::Slice {
            source,
            start,
            stop,
        } => {
            // Slice normalization guarantees a plain signal underneath.
            let Value::Signal(id) = source.as_ref() else {
                return Err(InternalError::new(
                    "slice over a non-signal reached the printer; slice normalization missed it",
                ));
            };
            let name = table.get(*id);
            if stop - start == 1 {
                Ok(format!("{name}[{start}]"))
            } else {
                Ok(format!("{name}[{}:{start}]", stop - 1))
            }
        }
        Value::Concat(parts) => {
            // Verilog concatenation is written most-significant first.
            let mut printed = Vec::with_capacity(parts.len());
            for part in parts.iter().rev() {
                printed.push(print_value(part, design, table)?);
            }
            Ok(format!("{{{}}}", printed.join(", ")))
        }
        Value::Replicate { value, count } => {
            let inner = print_value(value, design, table)?;
            Ok(format!("{{{count}{{{inner}}}}}"))
        }
    }
}

fn print_binary(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    design: &Design,
    table: &NameTable,
) -> RivetResult<String> {
    let l_shape = lhs.shape(design);
    let r_shape = rhs.shape(design);
    let l = print_operand(lhs, l_shape, r_shape, op, design, table)?;
    let r = print_operand(rhs, r_shape, l_shape, op, design, table)?;
    let symbol = match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::And => "&",
        BinaryOp::Or => "|",
        BinaryOp::Xor => "^",
        BinaryOp::Shl => "<<",
        // Arithmetic shift preserves the sign of a signed left operand.
        BinaryOp::Shr => {
            if l_shape.signed {
                ">>>"
            } else {
                ">>"
            }
        }
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
    };
    Ok(format!("({l} {symbol} {r})"))
}

/// True for operators whose numeric result depends on operand signedness.
fn sign_sensitive(op: BinaryOp) -> bool {
    !matches!(op, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
}

fn print_operand(
    operand: &Value,
    own: Shape,
    other: Shape,
    op: BinaryOp,
    design: &Design,
    table: &NameTable,
) -> RivetResult<String> {
    let printed = print_value(operand, design, table)?;
    if sign_sensitive(op) && !own.signed && other.signed {
        Ok(format!("$signed({{1'd0, {printed}}})"))
    } else {
        Ok(printed)
    }
}
