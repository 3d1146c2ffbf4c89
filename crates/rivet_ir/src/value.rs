//! Expression trees over signals and constants.
//!
//! A [`Value`] is an immutable tree describing a bit-vector computation.
//! The width and signedness of every node is a pure structural function of
//! its operands, computed by [`Value::shape`] and never stored in the node,
//! so values cannot drift out of sync with their operands.

use crate::design::Design;
use crate::error::IrError;
use crate::signal::SignalId;
use rivet_common::Const;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise NOT (`~`).
    Not,
    /// Arithmetic negation (`-`).
    Neg,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Sub,
    /// Multiplication (`*`).
    Mul,
    /// Bitwise AND (`&`).
    And,
    /// Bitwise OR (`|`).
    Or,
    /// Bitwise XOR (`^`).
    Xor,
    /// Logical shift left (`<<`).
    Shl,
    /// Shift right (`>>`), arithmetic for signed left operands.
    Shr,
    /// Equality (`==`).
    Eq,
    /// Inequality (`!=`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
}

impl BinaryOp {
    /// Returns `true` for operators producing a single-bit unsigned result.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

/// The inferred width and signedness of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    /// Bit width.
    pub width: u32,
    /// Two's-complement signedness.
    pub signed: bool,
}

/// An immutable expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A reference to a signal.
    Signal(SignalId),
    /// A literal constant.
    Const(Const),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Value>,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left-hand operand.
        lhs: Box<Value>,
        /// The right-hand operand.
        rhs: Box<Value>,
    },
    /// A two-way selection (`cond ? if_true : if_false`).
    Mux {
        /// The selecting condition; nonzero selects `if_true`.
        cond: Box<Value>,
        /// The value when the condition is nonzero.
        if_true: Box<Value>,
        /// The value when the condition is zero.
        if_false: Box<Value>,
    },
    /// A bit slice selecting `[start, stop)` of the source, LSB first.
    Slice {
        /// The value being sliced.
        source: Box<Value>,
        /// First selected bit (inclusive).
        start: u32,
        /// One past the last selected bit.
        stop: u32,
    },
    /// A concatenation of parts, lowest-order part first.
    Concat(Vec<Value>),
    /// A value repeated `count` times.
    Replicate {
        /// The repeated value.
        value: Box<Value>,
        /// The repetition count.
        count: u32,
    },
}

impl Value {
    /// Computes the width and signedness of this value.
    ///
    /// Purely structural: operator results follow a fixed per-operator
    /// table, slices and concatenations are unsigned, and a binary
    /// operator's result is signed iff either operand is signed.
    pub fn shape(&self, design: &Design) -> Shape {
        match self {
            Value::Signal(id) => {
                let sig = design.signal(*id);
                Shape {
                    width: sig.width,
                    signed: sig.signed,
                }
            }
            Value::Const(c) => Shape {
                width: c.width(),
                signed: c.signed(),
            },
            Value::Unary { op, operand } => {
                let inner = operand.shape(design);
                match op {
                    UnaryOp::Not => inner,
                    UnaryOp::Neg => Shape {
                        width: inner.width + 1,
                        signed: true,
                    },
                }
            }
            Value::Binary { op, lhs, rhs } => {
                let l = lhs.shape(design);
                let r = rhs.shape(design);
                let signed = l.signed || r.signed;
                match op {
                    BinaryOp::Add | BinaryOp::Sub => Shape {
                        width: l.width.max(r.width) + 1,
                        signed,
                    },
                    BinaryOp::Mul => Shape {
                        width: l.width + r.width,
                        signed,
                    },
                    BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => Shape {
                        width: l.width.max(r.width),
                        signed,
                    },
                    BinaryOp::Shl => {
                        // Widened by the shift amount's maximum value.
                        let max_shift = (1u64 << r.width.min(31)) - 1;
                        let width = (u64::from(l.width) + max_shift).min(u64::from(u32::MAX));
                        Shape {
                            width: width as u32,
                            signed,
                        }
                    }
                    BinaryOp::Shr => Shape {
                        width: l.width,
                        signed,
                    },
                    _ => Shape {
                        width: 1,
                        signed: false,
                    },
                }
            }
            Value::Mux {
                if_true, if_false, ..
            } => {
                let t = if_true.shape(design);
                let f = if_false.shape(design);
                Shape {
                    width: t.width.max(f.width),
                    signed: t.signed || f.signed,
                }
            }
            Value::Slice { start, stop, .. } => Shape {
                width: stop - start,
                signed: false,
            },
            Value::Concat(parts) => Shape {
                width: parts.iter().map(|p| p.shape(design).width).sum(),
                signed: false,
            },
            Value::Replicate { value, count } => Shape {
                width: value.shape(design).width * count,
                signed: false,
            },
        }
    }

    /// Selects bits `[start, stop)` of this value.
    ///
    /// Fails with [`IrError::InvalidSlice`] unless
    /// `0 <= start < stop <= width`.
    pub fn slice(self, start: u32, stop: u32, design: &Design) -> Result<Value, IrError> {
        let width = self.shape(design).width;
        if start >= stop || stop > width {
            return Err(IrError::InvalidSlice { start, stop, width });
        }
        Ok(Value::Slice {
            source: Box::new(self),
            start,
            stop,
        })
    }

    /// Selects the single bit at `index`.
    pub fn bit(self, index: u32, design: &Design) -> Result<Value, IrError> {
        self.slice(index, index + 1, design)
    }

    /// Concatenates parts, lowest-order part first.
    pub fn concat(parts: Vec<Value>) -> Value {
        Value::Concat(parts)
    }

    /// Repeats this value `count` times.
    pub fn repeat(self, count: u32) -> Value {
        Value::Replicate {
            value: Box::new(self),
            count,
        }
    }

    /// Builds a two-way selection with this value as the condition.
    pub fn mux(self, if_true: impl Into<Value>, if_false: impl Into<Value>) -> Value {
        Value::Mux {
            cond: Box::new(self),
            if_true: Box::new(if_true.into()),
            if_false: Box::new(if_false.into()),
        }
    }

    /// Builds a comparison against another value.
    pub fn compare(self, op: BinaryOp, rhs: impl Into<Value>) -> Value {
        debug_assert!(op.is_comparison());
        Value::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    /// Collects every signal read by this value into `out`.
    pub fn read_signals(&self, out: &mut BTreeSet<SignalId>) {
        match self {
            Value::Signal(id) => {
                out.insert(*id);
            }
            Value::Const(_) => {}
            Value::Unary { operand, .. } => operand.read_signals(out),
            Value::Binary { lhs, rhs, .. } => {
                lhs.read_signals(out);
                rhs.read_signals(out);
            }
            Value::Mux {
                cond,
                if_true,
                if_false,
            } => {
                cond.read_signals(out);
                if_true.read_signals(out);
                if_false.read_signals(out);
            }
            Value::Slice { source, .. } => source.read_signals(out),
            Value::Concat(parts) => {
                for part in parts {
                    part.read_signals(out);
                }
            }
            Value::Replicate { value, .. } => value.read_signals(out),
        }
    }
}

impl From<SignalId> for Value {
    fn from(id: SignalId) -> Self {
        Value::Signal(id)
    }
}

impl From<Const> for Value {
    fn from(c: Const) -> Self {
        Value::Const(c)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Const(Const::from_int(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Const(Const::from(value))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Value>> std::ops::$trait<T> for Value {
            type Output = Value;

            fn $method(self, rhs: T) -> Value {
                Value::Binary {
                    op: $op,
                    lhs: Box::new(self),
                    rhs: Box::new(rhs.into()),
                }
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(BitAnd, bitand, BinaryOp::And);
impl_binary_op!(BitOr, bitor, BinaryOp::Or);
impl_binary_op!(BitXor, bitxor, BinaryOp::Xor);
impl_binary_op!(Shl, shl, BinaryOp::Shl);
impl_binary_op!(Shr, shr, BinaryOp::Shr);

impl std::ops::Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        Value::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(self),
        }
    }
}

impl std::ops::Not for Value {
    type Output = Value;

    fn not(self) -> Value {
        Value::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalSpec;

    fn fixture() -> (Design, Value, Value) {
        let mut design = Design::new();
        let a = design.add_signal(SignalSpec::new(8));
        let b = design.add_signal(SignalSpec::new(4).signed());
        (design, Value::Signal(a), Value::Signal(b))
    }

    #[test]
    fn signal_shape() {
        let (design, a, b) = fixture();
        assert_eq!(
            a.shape(&design),
            Shape {
                width: 8,
                signed: false
            }
        );
        assert_eq!(
            b.shape(&design),
            Shape {
                width: 4,
                signed: true
            }
        );
    }

    #[test]
    fn add_widens_by_one() {
        let (design, a, b) = fixture();
        let sum = a + b;
        assert_eq!(
            sum.shape(&design),
            Shape {
                width: 9,
                signed: true
            }
        );
    }

    #[test]
    fn mul_sums_widths() {
        let (design, a, b) = fixture();
        let prod = a * b;
        assert_eq!(
            prod.shape(&design),
            Shape {
                width: 12,
                signed: true
            }
        );
    }

    #[test]
    fn bitwise_takes_max_width() {
        let (design, a, b) = fixture();
        let v = a & b;
        assert_eq!(
            v.shape(&design),
            Shape {
                width: 8,
                signed: true
            }
        );
    }

    #[test]
    fn shl_adds_shift_maximum() {
        let (design, a, b) = fixture();
        // 8-bit value shifted by a 4-bit amount: worst case 8 + 15.
        let v = a << b;
        assert_eq!(v.shape(&design).width, 23);
    }

    #[test]
    fn shr_keeps_width() {
        let (design, a, b) = fixture();
        let v = a >> b;
        assert_eq!(v.shape(&design).width, 8);
    }

    #[test]
    fn comparisons_are_single_bit_unsigned() {
        let (design, a, b) = fixture();
        let v = a.compare(BinaryOp::Lt, b);
        assert_eq!(
            v.shape(&design),
            Shape {
                width: 1,
                signed: false
            }
        );
    }

    #[test]
    fn neg_widens_and_signs() {
        let (design, a, _) = fixture();
        let v = -a;
        assert_eq!(
            v.shape(&design),
            Shape {
                width: 9,
                signed: true
            }
        );
    }

    #[test]
    fn not_preserves_shape() {
        let (design, _, b) = fixture();
        let v = !b;
        assert_eq!(
            v.shape(&design),
            Shape {
                width: 4,
                signed: true
            }
        );
    }

    #[test]
    fn mux_takes_branch_maximum() {
        let (design, a, b) = fixture();
        let cond = Value::from(true);
        let v = cond.mux(a, b);
        assert_eq!(
            v.shape(&design),
            Shape {
                width: 8,
                signed: true
            }
        );
    }

    #[test]
    fn slice_shape_and_bounds() {
        let (design, a, _) = fixture();
        let v = a.clone().slice(2, 6, &design).unwrap();
        assert_eq!(
            v.shape(&design),
            Shape {
                width: 4,
                signed: false
            }
        );
        assert_eq!(
            a.clone().slice(4, 4, &design),
            Err(IrError::InvalidSlice {
                start: 4,
                stop: 4,
                width: 8
            })
        );
        assert_eq!(
            a.slice(0, 9, &design),
            Err(IrError::InvalidSlice {
                start: 0,
                stop: 9,
                width: 8
            })
        );
    }

    #[test]
    fn concat_sums_widths() {
        let (design, a, b) = fixture();
        let v = Value::concat(vec![a, b]);
        assert_eq!(
            v.shape(&design),
            Shape {
                width: 12,
                signed: false
            }
        );
    }

    #[test]
    fn replicate_multiplies_width() {
        let (design, a, _) = fixture();
        let v = a.repeat(3);
        assert_eq!(v.shape(&design).width, 24);
    }

    #[test]
    fn const_shape_is_minimal() {
        let design = Design::new();
        assert_eq!(
            Value::from(5i64).shape(&design),
            Shape {
                width: 3,
                signed: false
            }
        );
        assert_eq!(
            Value::from(-2i64).shape(&design),
            Shape {
                width: 2,
                signed: true
            }
        );
    }

    #[test]
    fn read_signals_collects_all() {
        let (design, a, b) = fixture();
        let _ = design;
        let v = (a & b).mux(Value::from(1i64), Value::from(0i64));
        let mut read = BTreeSet::new();
        v.read_signals(&mut read);
        assert_eq!(read.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let (_, a, b) = fixture();
        let v = (a + b).repeat(2);
        let json = serde_json::to_string(&v).unwrap();
        let restored: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, restored);
    }
}
