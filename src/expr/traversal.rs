// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Structural queries over an expression tree.
//!
//! Callers use these to decide which event names to fetch before
//! evaluation, and to reject expressions that use an operator a given
//! deployment does not allow.

use std::collections::HashSet;

use crate::expr::{Expr, Operator};

/// Returns every distinct event name referenced by `expr`.
///
/// Names appear in first-occurrence order (left operand before right).
/// `AFTER` contributes only its operand's names.
#[must_use]
pub fn names(expr: &Expr) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect_names(expr, &mut seen, &mut out);
    out
}

fn collect_names<'a>(expr: &'a Expr, seen: &mut HashSet<&'a str>, out: &mut Vec<&'a str>) {
    match expr {
        Expr::EventName(name) => {
            if seen.insert(name.as_str()) {
                out.push(name.as_str());
            }
        }
        Expr::And(a, b) | Expr::Or(a, b) | Expr::Then(a, b) => {
            collect_names(a, seen, out);
            collect_names(b, seen, out);
        }
        Expr::Not(a) | Expr::After(a, _) => collect_names(a, seen, out),
    }
}

/// Returns true if the root of `expr` is the same operator as the root of
/// `other`. The operands of `other` are ignored.
#[must_use]
pub fn is_operator(expr: &Expr, other: &Expr) -> bool {
    expr.operator() == other.operator()
}

/// Returns true if `expr` or any of its subexpressions has the same root
/// operator as `other`.
#[must_use]
pub fn contains_operator(expr: &Expr, other: &Expr) -> bool {
    expr.contains(other.operator())
}

impl Expr {
    /// Returns true if `op` appears anywhere in this tree.
    #[must_use]
    pub fn contains(&self, op: Operator) -> bool {
        if self.operator() == op {
            return true;
        }
        match self {
            Self::EventName(_) => false,
            Self::And(a, b) | Self::Or(a, b) | Self::Then(a, b) => a.contains(op) || b.contains(op),
            Self::Not(a) | Self::After(a, _) => a.contains(op),
        }
    }
}
