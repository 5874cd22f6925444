// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Collect-then-evaluate state for a single trigger.
//!
//! A [`TriggerState`] gathers events for one subject (a user, a device) from
//! possibly unordered, partitioned sources, then sorts them and evaluates an
//! encoded expression once everything has arrived.
//!
//! ```
//! use triggers::common::event::Event;
//! use triggers::trigger::TriggerState;
//!
//! let mut state = TriggerState::new();
//! state.set_expression(
//!     r#"{"operator":"then","a":{"operator":"event_name","a":"view"},"b":{"operator":"event_name","a":"purchase"}}"#,
//! );
//! state.update(Event::new("purchase", 200));
//! state.update(Event::new("view", 100));
//! assert!(state.finalize_match().unwrap());
//! ```

use std::collections::HashSet;

use crate::common::event::{sort_events, Event};
use crate::common::timestamp::{Clock, SystemClock};
use crate::expr::codec::{decode_str, CodecError};
use crate::expr::traversal::names;
use crate::expr::Expr;
use crate::matcher::Matcher;

/// Accumulated events plus the expression to evaluate over them.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct TriggerState {
    /// Collected events. Sorted in finalize.
    pub events: Vec<Event>,
    /// Encoded expression (decoded on first use in finalize).
    pub expression_str: Option<String>,
    /// Cached decoded expression (populated during finalize).
    compiled: Option<Expr>,
}

impl TriggerState {
    /// Creates a new empty state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            expression_str: None,
            compiled: None,
        }
    }

    /// Creates a state for an already-built expression.
    #[must_use]
    pub const fn with_expression(expr: Expr) -> Self {
        Self {
            events: Vec::new(),
            expression_str: None,
            compiled: Some(expr),
        }
    }

    /// Sets the encoded expression. Only the first call has an effect.
    pub fn set_expression(&mut self, json: &str) {
        if self.expression_str.is_none() && self.compiled.is_none() {
            self.expression_str = Some(json.to_string());
        }
    }

    /// Adds an event to the state.
    pub fn update(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Combines two states by concatenating their event lists, returning a
    /// new state.
    ///
    /// Events need not be ordered; finalize sorts them.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Self {
        let mut events = Vec::with_capacity(self.events.len() + other.events.len());
        events.extend_from_slice(&self.events);
        events.extend_from_slice(&other.events);
        let (expression_str, compiled) = if self.has_expression() {
            (self.expression_str.clone(), self.compiled.clone())
        } else {
            (other.expression_str.clone(), other.compiled.clone())
        };
        Self {
            events,
            expression_str,
            compiled,
        }
    }

    /// Combines another state into `self` in-place by appending its events.
    ///
    /// Preferred for left-fold chains: extending in place keeps the total
    /// copy cost linear. The decoded expression is kept when `self` already
    /// has one.
    pub fn combine_in_place(&mut self, other: &Self) {
        self.events.extend_from_slice(&other.events);
        if !self.has_expression() {
            self.expression_str.clone_from(&other.expression_str);
            self.compiled.clone_from(&other.compiled);
        }
    }

    /// Drops collected events whose names the expression never mentions,
    /// returning the number removed.
    ///
    /// Irrelevant events cannot witness any predicate, so the result of
    /// finalize is unchanged. The one shape where they still matter is a
    /// THEN whose left side can hold with no events at all (`NOT x THEN y`):
    /// it may split inside a run of irrelevant events. For such expressions
    /// nothing is removed and the result is `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if the expression is missing or invalid.
    pub fn retain_relevant(&mut self) -> Result<usize, CodecError> {
        let before = self.events.len();
        let expr = self.expression()?;
        if splits_on_absence(expr) {
            log::debug!("keeping all {before} events: {expr} can split on absence");
            return Ok(0);
        }
        let wanted: HashSet<String> = names(expr).into_iter().map(str::to_owned).collect();
        self.events.retain(|e| wanted.contains(&e.name));
        Ok(before - self.events.len())
    }

    /// Sorts the collected events and evaluates the expression with
    /// wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if the expression is missing or invalid.
    pub fn finalize_match(&mut self) -> Result<bool, CodecError> {
        Ok(self.finalize_with_index()?.1)
    }

    /// Like [`finalize_match`](Self::finalize_match), also returning the
    /// index (into the sorted events) of the outermost witness.
    pub fn finalize_with_index(&mut self) -> Result<(Option<usize>, bool), CodecError> {
        self.finalize_with_clock(&SystemClock)
    }

    /// Sorts the collected events and evaluates the expression, reading time
    /// from `clock`.
    pub fn finalize_with_clock<C: Clock>(
        &mut self,
        clock: &C,
    ) -> Result<(Option<usize>, bool), CodecError> {
        sort_events(&mut self.events);
        self.expression()?;
        // Split borrows: the expression is read while events stay shared.
        let Self {
            events, compiled, ..
        } = self;
        let expr = compiled
            .as_ref()
            .ok_or_else(|| CodecError::InvalidExpression("no expression set".to_string()))?;
        Ok(Matcher::with_clock(clock).evaluate_with_index(expr, events))
    }

    fn has_expression(&self) -> bool {
        self.compiled.is_some() || self.expression_str.is_some()
    }

    /// Returns the decoded expression, decoding and caching it on first use.
    fn expression(&mut self) -> Result<&Expr, CodecError> {
        if self.compiled.is_none() {
            let json = self
                .expression_str
                .as_deref()
                .ok_or_else(|| CodecError::InvalidExpression("no expression set".to_string()))?;
            self.compiled = Some(decode_str(json)?);
        }
        self.compiled
            .as_ref()
            .ok_or_else(|| CodecError::InvalidExpression("no expression set".to_string()))
    }
}

impl Default for TriggerState {
    fn default() -> Self {
        Self::new()
    }
}

/// True if some THEN in `expr` has a left operand that may hold without
/// any event.
fn splits_on_absence(expr: &Expr) -> bool {
    match expr {
        Expr::EventName(_) => false,
        Expr::Then(a, b) => {
            holds_without_events(a) || splits_on_absence(a) || splits_on_absence(b)
        }
        Expr::And(a, b) | Expr::Or(a, b) => splits_on_absence(a) || splits_on_absence(b),
        Expr::Not(a) | Expr::After(a, _) => splits_on_absence(a),
    }
}

/// Conservative: false only when every way of satisfying `expr` needs a
/// matching event.
fn holds_without_events(expr: &Expr) -> bool {
    match expr {
        Expr::EventName(_) => false,
        Expr::Not(_) => true,
        Expr::And(a, b) | Expr::Then(a, b) => holds_without_events(a) && holds_without_events(b),
        Expr::Or(a, b) => holds_without_events(a) || holds_without_events(b),
        Expr::After(a, _) => holds_without_events(a),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::common::timestamp::FixedClock;
    use crate::expr::Duration;
    use proptest::prelude::*;

    const NAMES: [&str; 4] = ["view", "cart", "purchase", "noise"];

    fn arb_events() -> impl Strategy<Value = Vec<Event>> {
        prop::collection::vec((0..NAMES.len(), 0..100i64), 0..12)
            .prop_map(|raw| raw.into_iter().map(|(n, ts)| Event::new(NAMES[n], ts)).collect())
    }

    fn arb_expr() -> impl Strategy<Value = Expr> {
        let leaf = (0..3usize).prop_map(|n| Expr::event(NAMES[n]));
        leaf.prop_recursive(3, 16, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::and(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::or(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::then(a, b)),
                inner.clone().prop_map(Expr::not),
                (inner, -50..50i64).prop_map(|(a, d)| Expr::after(a, Duration(d))),
            ]
        })
    }

    fn funnel() -> Expr {
        Expr::then(
            Expr::event("view"),
            Expr::then(
                Expr::and(Expr::event("cart"), Expr::not(Expr::event("purchase"))),
                Expr::event("purchase"),
            ),
        )
    }

    proptest! {
        #[test]
        fn combine_preserves_events(a in arb_events(), b in arb_events()) {
            let mut left = TriggerState::with_expression(funnel());
            let mut right = TriggerState::new();
            for e in &a {
                left.update(e.clone());
            }
            for e in &b {
                right.update(e.clone());
            }
            let combined = left.combine(&right);
            prop_assert_eq!(combined.events.len(), a.len() + b.len());
        }

        #[test]
        fn combine_order_does_not_change_result(a in arb_events(), b in arb_events()) {
            let clock = FixedClock(1_000);
            let mut left = TriggerState::with_expression(funnel());
            let mut right = TriggerState::with_expression(funnel());
            for e in &a {
                left.update(e.clone());
            }
            for e in &b {
                right.update(e.clone());
            }
            // Distinct timestamps make the sorted order unique.
            let mut ab = left.combine(&right);
            sort_events(&mut ab.events);
            ab.events.dedup_by_key(|e| e.timestamp_us);
            let mut ba = ab.clone();
            ba.events.reverse();
            let x = ab.finalize_with_clock(&clock).unwrap().1;
            let y = ba.finalize_with_clock(&clock).unwrap().1;
            prop_assert_eq!(x, y);
        }

        #[test]
        fn retain_relevant_preserves_result(events in arb_events()) {
            let clock = FixedClock(1_000);
            let mut full = TriggerState::with_expression(funnel());
            for e in &events {
                full.update(e.clone());
            }
            let mut trimmed = full.clone();
            trimmed.retain_relevant().unwrap();
            let x = full.finalize_with_clock(&clock).unwrap().1;
            let y = trimmed.finalize_with_clock(&clock).unwrap().1;
            prop_assert_eq!(x, y);
        }

        #[test]
        fn retain_relevant_never_flips_result(expr in arb_expr(), events in arb_events()) {
            let clock = FixedClock(80);
            let mut full = TriggerState::with_expression(expr);
            for e in &events {
                full.update(e.clone());
            }
            let mut trimmed = full.clone();
            trimmed.retain_relevant().unwrap();
            let x = full.finalize_with_clock(&clock).unwrap().1;
            let y = trimmed.finalize_with_clock(&clock).unwrap().1;
            prop_assert_eq!(x, y);
        }
    }
}
