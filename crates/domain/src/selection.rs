//! Event selection: picks the meeting that drives the light at a boundary.
//!
//! The light only knows two signals, so the longest event up to the cap wins
//! and anything longer is treated as "nothing to signal" rather than clipped.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::calendar::Event;
use crate::time::Timestamp;

/// Longest event that can still be signalled.
pub const DEFAULT_MAX_DURATION: TimeDelta = TimeDelta::hours(1);

/// Events up to this length use the short signal.
pub const SHORT_SIGNAL_LIMIT: TimeDelta = TimeDelta::minutes(30);

/// Light effect announcing a meeting, by length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Meeting of 30 minutes or less.
    #[serde(rename = "30m")]
    HalfHour,
    /// Meeting longer than 30 minutes, up to the cap.
    #[serde(rename = "60m")]
    Hour,
}

impl Signal {
    /// Bucket a meeting duration.
    #[must_use]
    pub fn for_duration(duration: TimeDelta) -> Self {
        if duration <= SHORT_SIGNAL_LIMIT {
            Self::HalfHour
        } else {
            Self::Hour
        }
    }

    /// Effect name understood by the light.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HalfHour => "30m",
            Self::Hour => "60m",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The event chosen to drive the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub duration: TimeDelta,
    pub end: Timestamp,
}

impl Selection {
    /// Signal matching the selected duration.
    #[must_use]
    pub fn signal(&self) -> Signal {
        Signal::for_duration(self.duration)
    }
}

/// Pick the longest event with `0 < duration <= max_duration`.
///
/// On ties the first event encountered wins. Returns `None` when no event
/// qualifies.
#[must_use]
pub fn select_event(events: &[Event], max_duration: TimeDelta) -> Option<Selection> {
    let mut best: Option<Selection> = None;
    for event in events {
        let duration = event.duration();
        if duration > max_duration {
            continue;
        }
        let current = best.map_or(TimeDelta::zero(), |s| s.duration);
        if duration > current {
            best = Some(Selection {
                duration,
                end: event.end,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2021, 6, 14, h, m, 0).unwrap()
    }

    fn event(start: Timestamp, end: Timestamp) -> Event {
        Event {
            summary: String::new(),
            status: "confirmed".to_string(),
            start,
            end,
        }
    }

    fn lasting(minutes: i64) -> Event {
        event(at(14, 30), at(14, 30) + TimeDelta::minutes(minutes))
    }

    #[test]
    fn should_select_nothing_from_empty_list() {
        assert_eq!(select_event(&[], DEFAULT_MAX_DURATION), None);
    }

    #[test]
    fn should_select_twenty_minute_event_with_short_signal() {
        let selection = select_event(&[event(at(14, 30), at(14, 50))], DEFAULT_MAX_DURATION).unwrap();
        assert_eq!(selection.duration, TimeDelta::minutes(20));
        assert_eq!(selection.end, at(14, 50));
        assert_eq!(selection.signal(), Signal::HalfHour);
        assert_eq!(selection.signal().as_str(), "30m");
    }

    #[test]
    fn should_ignore_event_longer_than_cap() {
        assert_eq!(select_event(&[event(at(14, 30), at(15, 45))], DEFAULT_MAX_DURATION), None);
        assert_eq!(select_event(&[lasting(90)], DEFAULT_MAX_DURATION), None);
        assert_eq!(select_event(&[lasting(61)], DEFAULT_MAX_DURATION), None);
    }

    #[test]
    fn should_accept_event_exactly_at_cap() {
        let selection = select_event(&[lasting(60)], DEFAULT_MAX_DURATION).unwrap();
        assert_eq!(selection.signal(), Signal::Hour);
    }

    #[test]
    fn should_bucket_on_thirty_minute_limit() {
        assert_eq!(Signal::for_duration(TimeDelta::minutes(30)), Signal::HalfHour);
        assert_eq!(Signal::for_duration(TimeDelta::minutes(31)), Signal::Hour);
        assert_eq!(Signal::for_duration(TimeDelta::minutes(1)), Signal::HalfHour);
    }

    #[test]
    fn should_pick_longest_eligible_event() {
        let events = [lasting(15), lasting(90), lasting(45), lasting(25)];
        let selection = select_event(&events, DEFAULT_MAX_DURATION).unwrap();
        assert_eq!(selection.duration, TimeDelta::minutes(45));
        assert_eq!(selection.signal(), Signal::Hour);
    }

    #[test]
    fn should_keep_first_event_on_tie() {
        let first = event(at(14, 30), at(15, 0));
        let second = event(at(14, 0), at(14, 30));
        let selection = select_event(&[first, second], DEFAULT_MAX_DURATION).unwrap();
        assert_eq!(selection.end, at(15, 0));
    }

    #[test]
    fn should_ignore_zero_and_negative_durations() {
        let events = [event(at(14, 30), at(14, 30)), event(at(14, 30), at(14, 0))];
        assert_eq!(select_event(&events, DEFAULT_MAX_DURATION), None);
    }

    #[test]
    fn should_match_maximum_among_eligible_events() {
        let durations = [5, 75, 30, 60, 61, 0, 59, 120, 31];
        let events: Vec<Event> = durations.iter().map(|&m| lasting(m)).collect();
        let expected = durations
            .iter()
            .copied()
            .filter(|&m| m > 0 && m <= 60)
            .max()
            .map(TimeDelta::minutes);
        let selected = select_event(&events, DEFAULT_MAX_DURATION).map(|s| s.duration);
        assert_eq!(selected, expected);
    }

    #[test]
    fn should_honour_custom_cap() {
        let events = [lasting(20), lasting(40)];
        let selection = select_event(&events, TimeDelta::minutes(30)).unwrap();
        assert_eq!(selection.duration, TimeDelta::minutes(20));
    }

    #[test]
    fn should_serialize_signal_as_effect_name() {
        assert_eq!(serde_json::to_string(&Signal::Hour).unwrap(), "\"60m\"");
        assert_eq!(Signal::HalfHour.to_string(), "30m");
    }
}
