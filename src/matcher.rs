// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Recursive evaluation of an [`Expr`] against a sorted event sequence.
//!
//! Every subexpression evaluates to a `Match` with these fields:
//!
//! - `index`: position of the event that witnessed the match, if any. `THEN`
//!   uses it to split the sequence and to timestamp the start of any
//!   `AFTER` window on its right side.
//! - `satisfied`: whether the subexpression holds.
//! - `after_threshold`: whether the evidence lies at or past the threshold
//!   inherited from an enclosing `AFTER`. For an event name that never
//!   occurs, this instead reports whether the clock has already passed the
//!   threshold, which is what lets `NOT x AFTER d` mean "x has not happened
//!   for d" rather than "x has not happened yet".
//!
//! Events must be sorted by timestamp (ascending); the matcher does not sort
//! and results on unsorted input are unspecified.

use crate::common::event::{is_sorted, Event};
use crate::common::timestamp::{at_or_after, Clock, SystemClock, Timestamp};
use crate::expr::Expr;

/// Result of evaluating one subexpression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Match {
    index: Option<usize>,
    satisfied: bool,
    after_threshold: bool,
}

impl Match {
    const FAILED: Self = Self {
        index: None,
        satisfied: false,
        after_threshold: false,
    };

    const fn new(index: Option<usize>, satisfied: bool, after_threshold: bool) -> Self {
        Self {
            index,
            satisfied,
            after_threshold,
        }
    }
}

/// Evaluates expressions with an injected time source.
///
/// The clock is read only when an event name has no occurrence at all; a
/// [`FixedClock`](crate::common::timestamp::FixedClock) makes evaluation
/// fully deterministic.
#[derive(Debug, Clone, Default)]
pub struct Matcher<C = SystemClock> {
    clock: C,
}

impl Matcher<SystemClock> {
    /// Creates a matcher that reads wall-clock time.
    #[must_use]
    pub const fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> Matcher<C> {
    /// Creates a matcher that reads time from `clock`.
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Returns true if `expr` is satisfied by `events`.
    pub fn evaluate(&self, expr: &Expr, events: &[Event]) -> bool {
        self.evaluate_with_index(expr, events).1
    }

    /// Evaluates `expr` and also returns the index of the event that
    /// witnessed the outermost match, if there is one.
    ///
    /// The index can be `None` even when satisfied, e.g. for `NOT x`, whose
    /// evidence is an absence.
    pub fn evaluate_with_index(&self, expr: &Expr, events: &[Event]) -> (Option<usize>, bool) {
        debug_assert!(is_sorted(events), "events must be sorted by timestamp");
        log::trace!("evaluating {expr} over {} events", events.len());
        let m = self.match_expr(expr, events, None);
        (m.index, m.satisfied)
    }

    fn match_expr(&self, expr: &Expr, events: &[Event], threshold: Option<Timestamp>) -> Match {
        match expr {
            Expr::EventName(name) => self.match_name(name, events, threshold),
            Expr::Or(a, b) => {
                let a = self.match_expr(a, events, threshold);
                let b = self.match_expr(b, events, threshold);
                let after = a.after_threshold || b.after_threshold;
                match (a.satisfied, b.satisfied) {
                    // An index-less side (e.g. a NOT) orders first.
                    (true, true) => Match::new(a.index.min(b.index), true, after),
                    (true, false) => Match::new(a.index, true, after),
                    (false, true) => Match::new(b.index, true, after),
                    (false, false) => Match::new(None, false, after),
                }
            }
            Expr::And(a, b) => {
                let a = self.match_expr(a, events, threshold);
                let b = self.match_expr(b, events, threshold);
                if a.satisfied && b.satisfied {
                    // Both pieces of evidence are needed, so the later one counts.
                    Match::new(
                        a.index.max(b.index),
                        true,
                        a.after_threshold && b.after_threshold,
                    )
                } else {
                    Match::FAILED
                }
            }
            Expr::Not(a) => {
                let a = self.match_expr(a, events, threshold);
                if a.satisfied {
                    Match::new(a.index, false, a.after_threshold)
                } else {
                    Match::new(None, true, a.after_threshold)
                }
            }
            Expr::Then(a, b) => self.match_then(a, b, events, threshold),
            Expr::After(a, d) => {
                // Without a threshold there is no point in time to measure
                // `d` from; only a THEN's right side supplies one.
                let Some(t) = threshold else {
                    return Match::FAILED;
                };
                let a = self.match_expr(a, events, Some(t.saturating_add(d.as_micros())));
                if a.satisfied {
                    Match::new(a.index, a.after_threshold, a.after_threshold)
                } else {
                    Match::FAILED
                }
            }
        }
    }

    fn match_name(&self, name: &str, events: &[Event], threshold: Option<Timestamp>) -> Match {
        if let Some(i) = events
            .iter()
            .position(|e| e.is_named(name) && at_or_after(e.timestamp_us, threshold))
        {
            return Match::new(Some(i), true, true);
        }
        if let Some(i) = events.iter().position(|e| e.is_named(name)) {
            return Match::new(Some(i), true, false);
        }
        // No occurrence: the threshold is met only once real time has
        // reached it.
        Match::new(None, false, at_or_after(self.clock.now_us(), threshold))
    }

    /// Tries split points from the longest prefix down. Shrinking the
    /// prefix can change which evidence `a` picks (or whether it holds at
    /// all), which in turn moves where `b` starts and its threshold.
    fn match_then(
        &self,
        a: &Expr,
        b: &Expr,
        events: &[Event],
        threshold: Option<Timestamp>,
    ) -> Match {
        for k in (1..=events.len()).rev() {
            let am = self.match_expr(a, &events[..k], threshold);
            if !am.satisfied {
                continue;
            }

            let (b_threshold, b_start) = match am.index {
                Some(ai) if ai < events.len() => (Some(events[ai].timestamp_us), ai + 1),
                _ => (threshold, 0),
            };

            let bm = self.match_expr(b, &events[b_start..], b_threshold);
            if bm.satisfied {
                let index = bm.index.map_or(am.index, |bi| Some(b_start + bi));
                log::trace!("THEN split at prefix {k}: a={:?} b={:?}", am.index, bm.index);
                return Match::new(index, true, am.after_threshold && bm.after_threshold);
            }
        }
        Match::FAILED
    }
}

/// Returns true if `expr` is satisfied by `events`, reading wall-clock time
/// where absence must be certified.
///
/// # Examples
///
/// ```
/// use triggers::common::event::Event;
/// use triggers::expr::Expr;
/// use triggers::matcher::evaluate;
///
/// let events = [Event::new("view", 100), Event::new("purchase", 200)];
/// let expr = Expr::then(Expr::event("view"), Expr::event("purchase"));
/// assert!(evaluate(&expr, &events));
/// ```
pub fn evaluate(expr: &Expr, events: &[Event]) -> bool {
    Matcher::new().evaluate(expr, events)
}

/// Like [`evaluate`], also returning the witness index of the outermost
/// match.
pub fn evaluate_with_index(expr: &Expr, events: &[Event]) -> (Option<usize>, bool) {
    Matcher::new().evaluate_with_index(expr, events)
}
