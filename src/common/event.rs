//! Named, timestamped events.
//!
//! An event sequence is a plain slice of [`Event`] sorted ascending by
//! timestamp. The matcher never sorts; sources that cannot guarantee order
//! call [`sort_events`] first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::timestamp::Timestamp;

/// A single named event at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Event name, compared exactly against `EventName` predicates.
    pub name: String,
    /// Timestamp in microseconds since Unix epoch.
    pub timestamp_us: Timestamp,
}

impl Event {
    /// Creates a new event with the given name and timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, timestamp_us: Timestamp) -> Self {
        Self {
            name: name.into(),
            timestamp_us,
        }
    }

    /// Creates an event stamped with a UTC date-time.
    #[must_use]
    pub fn at(name: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self::new(name, time.timestamp_micros())
    }

    /// Returns true if this event carries the given name.
    #[must_use]
    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Sorts events by timestamp (ascending).
///
/// Performs an O(n) presorted check first and skips the sort when events
/// already arrive in non-decreasing order, which is the common case for log
/// sources. The sort is stable: events sharing a timestamp keep their arrival
/// order, so "first occurrence" during matching stays deterministic.
pub fn sort_events(events: &mut [Event]) {
    if is_sorted(events) {
        return;
    }
    events.sort_by_key(|e| e.timestamp_us);
}

/// Returns true if `events` is sorted ascending by timestamp.
#[must_use]
pub fn is_sorted(events: &[Event]) -> bool {
    events
        .windows(2)
        .all(|w| w[0].timestamp_us <= w[1].timestamp_us)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_creation() {
        let e = Event::new("signup", 1_000_000);
        assert_eq!(e.name, "signup");
        assert_eq!(e.timestamp_us, 1_000_000);
        assert!(e.is_named("signup"));
        assert!(!e.is_named("Signup"));
    }

    #[test]
    fn test_event_at_datetime() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let e = Event::at("login", t);
        assert_eq!(e.timestamp_us, 1_704_067_201_000_000);
    }

    #[test]
    fn test_empty_name_allowed() {
        let e = Event::new("", 0);
        assert!(e.is_named(""));
    }

    #[test]
    fn test_sort_events() {
        let mut events = vec![
            Event::new("c", 300),
            Event::new("a", 100),
            Event::new("b", 200),
        ];
        sort_events(&mut events);
        assert_eq!(events[0].timestamp_us, 100);
        assert_eq!(events[1].timestamp_us, 200);
        assert_eq!(events[2].timestamp_us, 300);
    }

    #[test]
    fn test_sort_empty() {
        let mut events: Vec<Event> = vec![];
        sort_events(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_sort_keeps_arrival_order_for_equal_timestamps() {
        let mut events = vec![
            Event::new("late", 200),
            Event::new("first", 100),
            Event::new("second", 100),
        ];
        sort_events(&mut events);
        assert_eq!(events[0].name, "first");
        assert_eq!(events[1].name, "second");
        assert_eq!(events[2].name, "late");
    }

    #[test]
    fn test_sort_negative_timestamps() {
        let mut events = vec![
            Event::new("a", 100),
            Event::new("b", -200),
            Event::new("c", -100),
            Event::new("d", 0),
        ];
        sort_events(&mut events);
        let ts: Vec<i64> = events.iter().map(|e| e.timestamp_us).collect();
        assert_eq!(ts, vec![-200, -100, 0, 100]);
    }

    #[test]
    fn test_is_sorted() {
        assert!(is_sorted(&[]));
        assert!(is_sorted(&[Event::new("a", 1)]));
        assert!(is_sorted(&[Event::new("a", 1), Event::new("b", 1)]));
        assert!(!is_sorted(&[Event::new("a", 2), Event::new("b", 1)]));
    }

    #[test]
    fn test_event_serde() {
        let e = Event::new("purchase", 42);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#"{"name":"purchase","timestamp_us":42}"#);
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
