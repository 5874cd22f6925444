// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! # `triggers` — Temporal Trigger Expressions over Event Logs
//!
//! Decides whether a behavioral pattern such as "the user signed up, then
//! did not log in for 24 hours" holds over a time-ordered sequence of named
//! events.
//!
//! ## Operators
//!
//! | Operator | Constructor | Holds when |
//! |----------|-------------|------------|
//! | `name` | [`Expr::event`] | an event with this name is present |
//! | `a AND b` | [`Expr::and`] | both hold |
//! | `a OR b` | [`Expr::or`] | at least one holds |
//! | `NOT a` | [`Expr::not`] | `a` does not hold |
//! | `a THEN b` | [`Expr::then`] | `a` holds, and `b` holds over the events after `a`'s evidence |
//! | `a AFTER d` | [`Expr::after`] | `a` holds with all evidence at least `d` after the enclosing `THEN`'s left side |
//!
//! `AFTER` is only meaningful on the right side of a `THEN`; on its own it
//! never holds.
//!
//! ## Example
//!
//! ```
//! use triggers::{evaluate, Duration, Event, Expr};
//!
//! const HOUR: i64 = 3_600_000_000;
//!
//! let events = [
//!     Event::new("signup", -20 * HOUR),
//!     Event::new("login", -5 * HOUR),
//! ];
//! let expr = Expr::then(
//!     Expr::event("signup"),
//!     Expr::after(Expr::event("login"), Duration::from_hours(10)),
//! );
//! assert!(evaluate(&expr, &events));
//! ```
//!
//! Expressions travel as JSON through [`expr::codec`], and
//! [`trigger::TriggerState`] collects unordered events before evaluating.

pub mod common;
pub mod expr;
pub mod matcher;
pub mod trigger;

pub use common::event::Event;
pub use common::timestamp::{Clock, FixedClock, SystemClock};
pub use expr::codec::{decode, encode, CodecError};
pub use expr::traversal::{contains_operator, is_operator, names};
pub use expr::{Duration, Expr, Operator};
pub use matcher::{evaluate, evaluate_with_index, Matcher};
pub use trigger::TriggerState;
