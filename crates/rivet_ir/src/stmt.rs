//! Behavioral statements over values.
//!
//! Statement lists nest only through `If`/`Case` bodies; a flattened
//! fragment is a plain `Vec<Statement>` per execution context. The
//! traversal helpers here are pure queries used by the lowering passes and
//! the backend.

use crate::signal::SignalId;
use crate::value::Value;
use rivet_common::Const;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One arm of a [`Statement::Case`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    /// The constant matched against the selector.
    pub value: Const,
    /// The statements executed on a match.
    pub body: Vec<Statement>,
}

/// A behavioral statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// An assignment of `value` to `target`.
    ///
    /// The target is a signal, a slice of a signal, or a concatenation of
    /// such targets.
    Assign {
        /// The assigned target.
        target: Value,
        /// The assigned value.
        value: Value,
    },
    /// A two-way conditional.
    If {
        /// The branch condition; nonzero takes the `then` branch.
        condition: Value,
        /// Statements executed when the condition is nonzero.
        then_body: Vec<Statement>,
        /// Statements executed otherwise. May be empty.
        else_body: Vec<Statement>,
    },
    /// A multi-way selection over constant patterns.
    Case {
        /// The selecting value.
        selector: Value,
        /// The arms, matched in order.
        arms: Vec<CaseArm>,
        /// The statements executed when no arm matches.
        default: Option<Vec<Statement>>,
    },
}

impl Statement {
    /// Builds an assignment statement.
    pub fn assign(target: impl Into<Value>, value: impl Into<Value>) -> Statement {
        Statement::Assign {
            target: target.into(),
            value: value.into(),
        }
    }

    /// Builds a conditional without an else branch.
    pub fn when(condition: impl Into<Value>, then_body: Vec<Statement>) -> Statement {
        Statement::If {
            condition: condition.into(),
            then_body,
            else_body: Vec::new(),
        }
    }
}

/// Collects every signal written (fully or partially) by the statements.
///
/// Assignment targets are resolved through slices and concatenations down
/// to the underlying signals.
pub fn written_signals(stmts: &[Statement], out: &mut BTreeSet<SignalId>) {
    for stmt in stmts {
        match stmt {
            Statement::Assign { target, .. } => target_signals(target, out),
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                written_signals(then_body, out);
                written_signals(else_body, out);
            }
            Statement::Case {
                arms, default, ..
            } => {
                for arm in arms {
                    written_signals(&arm.body, out);
                }
                if let Some(default) = default {
                    written_signals(default, out);
                }
            }
        }
    }
}

/// Collects every signal read by the statements (right-hand sides,
/// conditions, and selectors).
pub fn read_signals(stmts: &[Statement], out: &mut BTreeSet<SignalId>) {
    for stmt in stmts {
        match stmt {
            Statement::Assign { value, .. } => value.read_signals(out),
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                condition.read_signals(out);
                read_signals(then_body, out);
                read_signals(else_body, out);
            }
            Statement::Case {
                selector,
                arms,
                default,
            } => {
                selector.read_signals(out);
                for arm in arms {
                    read_signals(&arm.body, out);
                }
                if let Some(default) = default {
                    read_signals(default, out);
                }
            }
        }
    }
}

/// Resolves an assignment target down to the signals it writes.
pub fn target_signals(target: &Value, out: &mut BTreeSet<SignalId>) {
    match target {
        Value::Signal(id) => {
            out.insert(*id);
        }
        Value::Slice { source, .. } => target_signals(source, out),
        Value::Concat(parts) => {
            for part in parts {
                target_signals(part, out);
            }
        }
        // Operators cannot appear in a well-formed target.
        _ => {}
    }
}
