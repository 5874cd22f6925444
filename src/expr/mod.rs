// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Temporal trigger expressions.
//!
//! An [`Expr`] is an immutable tree over event-name predicates:
//!
//! ```text
//! expr       ::= expr AND expr | expr OR expr | NOT expr
//!              | expr THEN expr | expr AFTER duration | event_name
//! event_name ::= string
//! duration   ::= signed microseconds
//! ```
//!
//! `THEN` splits the event sequence: its left side is matched against a
//! prefix and its right side against the events that follow. `AFTER` only
//! has meaning as (part of) the right side of a `THEN`, where the time of the
//! left side's evidence gives it a point to measure the duration from.

pub mod codec;
pub mod traversal;

use std::fmt;

use crate::common::timestamp::{
    MICROS_PER_HOUR, MICROS_PER_MILLI, MICROS_PER_MINUTE, MICROS_PER_SECOND,
};

/// A signed span of time in microseconds.
///
/// Negative durations are legal: `AFTER -1h` moves the threshold back
/// instead of forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub i64);

impl Duration {
    /// The zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from microseconds.
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Creates a duration from seconds, saturating on overflow.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(MICROS_PER_SECOND))
    }

    /// Creates a duration from minutes, saturating on overflow.
    #[must_use]
    pub const fn from_mins(mins: i64) -> Self {
        Self(mins.saturating_mul(MICROS_PER_MINUTE))
    }

    /// Creates a duration from hours, saturating on overflow.
    #[must_use]
    pub const fn from_hours(hours: i64) -> Self {
        Self(hours.saturating_mul(MICROS_PER_HOUR))
    }

    /// Returns the tick count in microseconds.
    #[must_use]
    pub const fn as_micros(self) -> i64 {
        self.0
    }
}

impl From<chrono::TimeDelta> for Duration {
    /// Converts at microsecond precision. Deltas beyond the `i64`
    /// microsecond range saturate.
    fn from(delta: chrono::TimeDelta) -> Self {
        match delta.num_microseconds() {
            Some(us) => Self(us),
            None if delta < chrono::TimeDelta::zero() => Self(i64::MIN),
            None => Self(i64::MAX),
        }
    }
}

impl fmt::Display for Duration {
    /// Renders as unit components, e.g. `10h`, `1h30m`, `250ms`, `-5h`, `0s`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let mut rest = self.0.unsigned_abs();
        for (unit, suffix) in [
            (MICROS_PER_HOUR, "h"),
            (MICROS_PER_MINUTE, "m"),
            (MICROS_PER_SECOND, "s"),
            (MICROS_PER_MILLI, "ms"),
            (1, "us"),
        ] {
            let unit = unit as u64;
            let n = rest / unit;
            if n > 0 {
                write!(f, "{n}{suffix}")?;
            }
            rest %= unit;
        }
        Ok(())
    }
}

/// A temporal boolean expression over event names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Holds when an event with exactly this name is present.
    EventName(String),
    /// Holds when both operands hold.
    And(Box<Expr>, Box<Expr>),
    /// Holds when at least one operand holds.
    Or(Box<Expr>, Box<Expr>),
    /// Holds when the operand does not.
    Not(Box<Expr>),
    /// Holds when the left operand holds over some prefix of the events and
    /// the right operand holds over the events after the left's evidence.
    Then(Box<Expr>, Box<Expr>),
    /// Holds when the operand holds and all of its evidence lies no earlier
    /// than the inherited threshold shifted by the duration.
    After(Box<Expr>, Duration),
}

impl Expr {
    /// `name`
    #[must_use]
    pub fn event(name: impl Into<String>) -> Self {
        Self::EventName(name.into())
    }

    /// `a AND b`
    #[must_use]
    pub fn and(a: Self, b: Self) -> Self {
        Self::And(Box::new(a), Box::new(b))
    }

    /// `a OR b`
    #[must_use]
    pub fn or(a: Self, b: Self) -> Self {
        Self::Or(Box::new(a), Box::new(b))
    }

    /// `NOT a`
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(a: Self) -> Self {
        Self::Not(Box::new(a))
    }

    /// `a THEN b`
    #[must_use]
    pub fn then(a: Self, b: Self) -> Self {
        Self::Then(Box::new(a), Box::new(b))
    }

    /// `a AFTER d`
    #[must_use]
    pub fn after(a: Self, d: Duration) -> Self {
        Self::After(Box::new(a), d)
    }

    /// Returns the operator tag of the root node.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        match self {
            Self::EventName(_) => Operator::EventName,
            Self::And(..) => Operator::And,
            Self::Or(..) => Operator::Or,
            Self::Not(_) => Operator::Not,
            Self::Then(..) => Operator::Then,
            Self::After(..) => Operator::After,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventName(name) => write!(f, "\"{name}\""),
            Self::And(a, b) => write!(f, "({a} AND {b})"),
            Self::Or(a, b) => write!(f, "({a} OR {b})"),
            Self::Not(a) => write!(f, "(NOT {a})"),
            Self::Then(a, b) => write!(f, "({a} THEN {b})"),
            Self::After(a, d) => write!(f, "({a} AFTER {d})"),
        }
    }
}

/// The operator at the root of an [`Expr`], without its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// [`Expr::EventName`]
    EventName,
    /// [`Expr::And`]
    And,
    /// [`Expr::Or`]
    Or,
    /// [`Expr::Not`]
    Not,
    /// [`Expr::Then`]
    Then,
    /// [`Expr::After`]
    After,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::EventName,
        Self::And,
        Self::Or,
        Self::Not,
        Self::Then,
        Self::After,
    ];

    /// Value of the `operator` field on the wire. The codec writes and reads
    /// tags through this table only.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EventName => "event_name",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Then => "then",
            Self::After => "after",
        }
    }

    /// Inverse of [`Operator::as_str`].
    #[must_use]
    pub fn from_wire(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == tag)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
