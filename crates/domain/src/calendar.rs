//! Calendar events: what a calendar source reports, and the subset the
//! scheduler can act upon.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Status value marking an event that will not take place.
pub const STATUS_CANCELLED: &str = "cancelled";

/// An event exactly as returned by a calendar source.
///
/// All-day events carry a date but no time of day, so they have neither a
/// `start` nor an `end` instant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub summary: String,
    pub status: String,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl RawEvent {
    /// Whether the event was cancelled by its organizer.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == STATUS_CANCELLED
    }
}

/// A timed, non-cancelled calendar occurrence.
///
/// Built fresh from each poll and discarded at the end of the iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Display text, never used for decisions.
    pub summary: String,
    pub status: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Event {
    /// Convert a raw event, dropping cancelled and all-day events.
    #[must_use]
    pub fn from_raw(raw: RawEvent) -> Option<Self> {
        if raw.is_cancelled() {
            return None;
        }
        let (Some(start), Some(end)) = (raw.start, raw.end) else {
            return None;
        };
        Some(Self {
            summary: raw.summary,
            status: raw.status,
            start,
            end,
        })
    }

    /// `end - start`, as reported by the source.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Keep only the events the scheduler can act upon, preserving source order.
#[must_use]
pub fn actionable(raw: Vec<RawEvent>) -> Vec<Event> {
    raw.into_iter().filter_map(Event::from_raw).collect()
}
