//! Time and timestamp helpers.
//!
//! Also hosts the wall-clock alignment used by the scheduler: polling is
//! phase-locked to fixed multiples of a period (half an hour in practice), so
//! the number of calendar queries per period stays constant no matter how
//! many events exist.

use std::time::Duration;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::error::AlignmentError;

/// UTC timestamp used for event start/end and wait targets.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the first multiple of `period` (counted from the Unix epoch) that
/// is not before `now`.
///
/// The result is always in `[now, now + period]`. A `now` that sits exactly
/// on a boundary is returned unchanged.
///
/// # Errors
///
/// Returns [`AlignmentError::NonPositivePeriod`] for a zero or negative
/// period, or a rounding/range error when the timestamp cannot be aligned.
pub fn next_boundary(now: Timestamp, period: TimeDelta) -> Result<Timestamp, AlignmentError> {
    if period <= TimeDelta::zero() {
        return Err(AlignmentError::NonPositivePeriod(period));
    }
    let floor = now.duration_trunc(period)?;
    if floor < now {
        floor
            .checked_add_signed(period)
            .ok_or(AlignmentError::OutOfRange)
    } else {
        Ok(floor)
    }
}

/// Instant at which the poll for `boundary` should be issued.
///
/// Close enough to the boundary that a last-minute meeting is already in the
/// calendar, early enough that the query completes before the boundary.
#[must_use]
pub fn early_margin(boundary: Timestamp, margin: TimeDelta) -> Timestamp {
    boundary - margin
}

/// Time left from `now` until `target`, clamped to zero.
#[must_use]
pub fn wait_for(now: Timestamp, target: Timestamp) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2021, 6, 14, h, m, s).unwrap()
    }

    fn half_hour() -> TimeDelta {
        TimeDelta::minutes(30)
    }

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_align_to_next_half_hour() {
        let boundary = next_boundary(at(14, 3, 0), half_hour()).unwrap();
        assert_eq!(boundary, at(14, 30, 0));
    }

    #[test]
    fn should_compute_early_margin_before_boundary() {
        let boundary = next_boundary(at(14, 3, 0), half_hour()).unwrap();
        let early = early_margin(boundary, TimeDelta::seconds(10));
        assert_eq!(early, at(14, 29, 50));
    }

    #[test]
    fn should_return_now_when_exactly_on_boundary() {
        let boundary = next_boundary(at(15, 0, 0), half_hour()).unwrap();
        assert_eq!(boundary, at(15, 0, 0));
    }

    #[test]
    fn should_advance_when_just_past_boundary() {
        let now = at(14, 30, 0) + TimeDelta::milliseconds(1);
        let boundary = next_boundary(now, half_hour()).unwrap();
        assert_eq!(boundary, at(15, 0, 0));
    }

    #[test]
    fn should_align_across_midnight() {
        let now = at(23, 45, 12);
        let boundary = next_boundary(now, half_hour()).unwrap();
        assert_eq!(boundary, Utc.with_ymd_and_hms(2021, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn should_stay_within_one_period_and_on_a_multiple() {
        let start = at(9, 0, 0);
        for step in 0..(2 * 60 * 60 / 7) {
            let now = start + TimeDelta::seconds(step * 7) + TimeDelta::milliseconds(step % 1000);
            let boundary = next_boundary(now, half_hour()).unwrap();
            assert!(boundary >= now, "{boundary} before {now}");
            assert!(boundary <= now + half_hour(), "{boundary} too far from {now}");
            assert_eq!(boundary.timestamp() % 1800, 0);
            assert_eq!(boundary.timestamp_subsec_nanos(), 0);
        }
    }

    #[test]
    fn should_reject_zero_period() {
        let result = next_boundary(at(14, 3, 0), TimeDelta::zero());
        assert!(matches!(result, Err(AlignmentError::NonPositivePeriod(_))));
    }

    #[test]
    fn should_reject_negative_period() {
        let result = next_boundary(at(14, 3, 0), TimeDelta::minutes(-30));
        assert!(matches!(result, Err(AlignmentError::NonPositivePeriod(_))));
    }

    #[test]
    fn should_wait_until_future_target() {
        let d = wait_for(at(14, 3, 0), at(14, 29, 50));
        assert_eq!(d, Duration::from_secs(26 * 60 + 50));
    }

    #[test]
    fn should_wait_zero_when_target_reached() {
        assert_eq!(wait_for(at(14, 30, 0), at(14, 30, 0)), Duration::ZERO);
    }

    #[test]
    fn should_never_return_negative_wait() {
        assert_eq!(wait_for(at(14, 31, 0), at(14, 30, 0)), Duration::ZERO);
    }

    #[test]
    fn should_wait_non_zero_iff_target_after_now() {
        let now = at(12, 0, 0);
        for offset in -5..=5 {
            let target = now + TimeDelta::milliseconds(offset);
            let d = wait_for(now, target);
            assert_eq!(d.is_zero(), target <= now);
        }
    }
}
