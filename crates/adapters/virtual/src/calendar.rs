//! Scripted calendar: a fixed agenda answering window queries.

use std::sync::{Mutex, PoisonError};

use chrono::TimeDelta;
use meetin_app::ports::CalendarSource;
use meetin_domain::calendar::RawEvent;
use meetin_domain::error::MeetinError;
use meetin_domain::time::Timestamp;

/// One `list_events` call as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub window_start: Timestamp,
    pub window: TimeDelta,
    pub calendar_id: String,
}

/// In-memory calendar returning the scripted events that overlap the
/// queried window.
///
/// Events without instants (all-day) overlap every window, as they would
/// on the day they are scheduled.
#[derive(Debug, Default)]
pub struct ScriptedCalendar {
    events: Vec<RawEvent>,
    queries: Mutex<Vec<Query>>,
}

impl ScriptedCalendar {
    #[must_use]
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every query received so far, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<Query> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events overlapping `[window_start, window_start + window)`, in
    /// script order.
    #[must_use]
    pub fn events_in(&self, window_start: Timestamp, window: TimeDelta) -> Vec<RawEvent> {
        let window_end = window_start + window;
        self.events
            .iter()
            .filter(|event| match (event.start, event.end) {
                (Some(start), Some(end)) => start < window_end && end > window_start,
                _ => true,
            })
            .cloned()
            .collect()
    }
}

impl CalendarSource for ScriptedCalendar {
    async fn list_events(
        &self,
        window_start: Timestamp,
        window: TimeDelta,
        calendar_id: &str,
    ) -> Result<Vec<RawEvent>, MeetinError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Query {
                window_start,
                window,
                calendar_id: calendar_id.to_string(),
            });
        let events = self.events_in(window_start, window);
        tracing::debug!(count = events.len(), %window_start, "scripted calendar queried");
        Ok(events)
    }
}
