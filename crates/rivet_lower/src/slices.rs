//! Slice normalization.
//!
//! The backend prints at most one slice operator per expression and only
//! over a plain signal, so nested slicing must be flattened first. This
//! pass rewrites slice-of-slice by composing start offsets and
//! slice-of-concat by selecting and re-slicing only the overlapping parts,
//! and collapses full-width slices entirely.

use rivet_ir::{Design, Fragment, Statement, Value};

/// Normalizes every slice in the fragment's statements.
pub fn normalize_slices(fragment: &mut Fragment, design: &Design) {
    for stmt in fragment.comb.iter_mut() {
        normalize_stmt(stmt, design);
    }
    for stmts in fragment.sync.values_mut() {
        for stmt in stmts.iter_mut() {
            normalize_stmt(stmt, design);
        }
    }
}

fn normalize_stmt(stmt: &mut Statement, design: &Design) {
    match stmt {
        Statement::Assign { target, value } => {
            take_normalized(target, design);
            take_normalized(value, design);
        }
        Statement::If {
            condition,
            then_body,
            else_body,
        } => {
            take_normalized(condition, design);
            for s in then_body.iter_mut().chain(else_body.iter_mut()) {
                normalize_stmt(s, design);
            }
        }
        Statement::Case {
            selector,
            arms,
            default,
        } => {
            take_normalized(selector, design);
            for arm in arms.iter_mut() {
                for s in arm.body.iter_mut() {
                    normalize_stmt(s, design);
                }
            }
            if let Some(default) = default {
                for s in default.iter_mut() {
                    normalize_stmt(s, design);
                }
            }
        }
    }
}

fn take_normalized(value: &mut Value, design: &Design) {
    let owned = std::mem::replace(value, Value::Concat(Vec::new()));
    *value = normalize_value(owned, design);
}

/// Returns an equivalent value in which every slice applies directly to a
/// non-slice, non-concatenation source.
pub fn normalize_value(value: Value, design: &Design) -> Value {
    match value {
        Value::Unary { op, operand } => Value::Unary {
            op,
            operand: Box::new(normalize_value(*operand, design)),
        },
        Value::Binary { op, lhs, rhs } => Value::Binary {
            op,
            lhs: Box::new(normalize_value(*lhs, design)),
            rhs: Box::new(normalize_value(*rhs, design)),
        },
        Value::Mux {
            cond,
            if_true,
            if_false,
        } => Value::Mux {
            cond: Box::new(normalize_value(*cond, design)),
            if_true: Box::new(normalize_value(*if_true, design)),
            if_false: Box::new(normalize_value(*if_false, design)),
        },
        Value::Concat(parts) => Value::Concat(
            parts
                .into_iter()
                .map(|p| normalize_value(p, design))
                .collect(),
        ),
        Value::Replicate { value, count } => Value::Replicate {
            value: Box::new(normalize_value(*value, design)),
            count,
        },
        Value::Slice {
            source,
            start,
            stop,
        } => normalize_slice(normalize_value(*source, design), start, stop, design),
        leaf => leaf,
    }
}

fn normalize_slice(source: Value, start: u32, stop: u32, design: &Design) -> Value {
    match source {
        // Compose the two start offsets into one flat slice.
        Value::Slice {
            source: inner,
            start: inner_start,
            ..
        } => normalize_slice(*inner, inner_start + start, inner_start + stop, design),
        // Keep only the parts overlapping the selected range, re-sliced.
        Value::Concat(parts) => {
            let mut pieces = Vec::new();
            let mut offset = 0u32;
            for part in parts {
                let width = part.shape(design).width;
                let lo = start.max(offset);
                let hi = stop.min(offset + width);
                if lo < hi {
                    pieces.push(normalize_slice(part, lo - offset, hi - offset, design));
                }
                offset += width;
            }
            if pieces.len() == 1 {
                pieces.pop().unwrap()
            } else {
                Value::Concat(pieces)
            }
        }
        other => {
            if start == 0 && stop == other.shape(design).width {
                other
            } else {
                Value::Slice {
                    source: Box::new(other),
                    start,
                    stop,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_ir::{SignalId, SignalSpec};

    fn fixture() -> (Design, SignalId, SignalId) {
        let mut design = Design::new();
        let a = design.add_signal(SignalSpec::new(16));
        let b = design.add_signal(SignalSpec::new(8));
        (design, a, b)
    }

    #[test]
    fn slice_of_slice_composes_offsets() {
        let (design, a, _) = fixture();
        let outer = Value::Signal(a)
            .slice(4, 12, &design)
            .unwrap()
            .slice(2, 6, &design)
            .unwrap();
        let flat = normalize_value(outer, &design);
        assert_eq!(
            flat,
            Value::Slice {
                source: Box::new(Value::Signal(a)),
                start: 6,
                stop: 10,
            }
        );
    }

    #[test]
    fn slice_of_slice_matches_direct_evaluation() {
        // For every legal nested range, the flattened slice must select
        // the same bits as evaluating the nested slice directly.
        let (design, a, _) = fixture();
        let width = 16u32;
        for outer_start in 0..width {
            for outer_stop in (outer_start + 1)..=width {
                let inner_width = outer_stop - outer_start;
                for inner_start in 0..inner_width {
                    for inner_stop in (inner_start + 1)..=inner_width {
                        let nested = Value::Signal(a)
                            .slice(outer_start, outer_stop, &design)
                            .unwrap()
                            .slice(inner_start, inner_stop, &design)
                            .unwrap();
                        let flat = normalize_value(nested, &design);
                        let expected_start = outer_start + inner_start;
                        let expected_stop = outer_start + inner_stop;
                        if expected_start == 0 && expected_stop == width {
                            assert_eq!(flat, Value::Signal(a));
                        } else {
                            assert_eq!(
                                flat,
                                Value::Slice {
                                    source: Box::new(Value::Signal(a)),
                                    start: expected_start,
                                    stop: expected_stop,
                                }
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn slice_of_concat_selects_overlapping_parts() {
        let (design, a, b) = fixture();
        // Concat is low-to-high: bits [0,16) from a, [16,24) from b.
        let cat = Value::concat(vec![Value::Signal(a), Value::Signal(b)]);
        // [12, 20) overlaps the top of a and the bottom of b.
        let sliced = cat.slice(12, 20, &design).unwrap();
        let flat = normalize_value(sliced, &design);
        assert_eq!(
            flat,
            Value::Concat(vec![
                Value::Slice {
                    source: Box::new(Value::Signal(a)),
                    start: 12,
                    stop: 16,
                },
                Value::Slice {
                    source: Box::new(Value::Signal(b)),
                    start: 0,
                    stop: 4,
                },
            ])
        );
    }

    #[test]
    fn slice_within_one_concat_part_unwraps() {
        let (design, a, b) = fixture();
        let cat = Value::concat(vec![Value::Signal(a), Value::Signal(b)]);
        let sliced = cat.slice(16, 24, &design).unwrap();
        // The selected range is exactly signal b.
        assert_eq!(normalize_value(sliced, &design), Value::Signal(b));
    }

    #[test]
    fn full_width_slice_collapses() {
        let (design, a, _) = fixture();
        let sliced = Value::Signal(a).slice(0, 16, &design).unwrap();
        assert_eq!(normalize_value(sliced, &design), Value::Signal(a));
    }

    #[test]
    fn normalizes_inside_statements() {
        let (design, a, b) = fixture();
        let nested = Value::Signal(a)
            .slice(0, 8, &design)
            .unwrap()
            .slice(0, 4, &design)
            .unwrap();
        let mut fragment = Fragment::new();
        fragment.push_comb(Statement::If {
            condition: nested.clone(),
            then_body: vec![Statement::assign(b, nested)],
            else_body: vec![],
        });
        normalize_slices(&mut fragment, &design);
        let Statement::If {
            condition,
            then_body,
            ..
        } = &fragment.comb[0]
        else {
            panic!("expected conditional");
        };
        let expected = Value::Slice {
            source: Box::new(Value::Signal(a)),
            start: 0,
            stop: 4,
        };
        assert_eq!(*condition, expected);
        let Statement::Assign { value, .. } = &then_body[0] else {
            panic!("expected assignment");
        };
        assert_eq!(*value, expected);
    }
}
