//! Calendar port: where upcoming meetings come from.

use std::future::Future;

use chrono::TimeDelta;
use meetin_domain::calendar::RawEvent;
use meetin_domain::error::MeetinError;
use meetin_domain::time::Timestamp;

/// A source of calendar events.
///
/// Implementations return events exactly as the source reports them,
/// including cancelled and all-day ones; filtering is the scheduler's job.
/// Authentication and transport belong to the implementation.
pub trait CalendarSource: Send + Sync {
    /// List the events of `calendar_id` in `[window_start, window_start + window)`.
    fn list_events(
        &self,
        window_start: Timestamp,
        window: TimeDelta,
        calendar_id: &str,
    ) -> impl Future<Output = Result<Vec<RawEvent>, MeetinError>> + Send;
}

impl<T: CalendarSource> CalendarSource for &T {
    fn list_events(
        &self,
        window_start: Timestamp,
        window: TimeDelta,
        calendar_id: &str,
    ) -> impl Future<Output = Result<Vec<RawEvent>, MeetinError>> + Send {
        (**self).list_events(window_start, window, calendar_id)
    }
}
