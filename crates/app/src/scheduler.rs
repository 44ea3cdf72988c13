//! Scheduler loop: signals upcoming meetings on the light.
//!
//! Each iteration walks the same states:
//!
//! ```text
//! Aligning ──► Polling ──► WaitingForBoundary ──► Signaling ──► Holding ──┐
//!    ▲            │                                   │                   │
//!    │            └── no actionable event ────────────┼──► IdleSkip ──────┤
//!    └────────────────────────────────────────────────┴───────────────────┘
//! ```
//!
//! Polls are phase-locked to the period boundaries and issued once per
//! boundary, slightly early so the answer is known when the boundary hits.
//! Every wait races the cancellation token; once cancellation is observed the
//! loop turns the light off one last time and returns.

use std::time::Duration;

use chrono::TimeDelta;
use meetin_domain::calendar::{self, Event};
use meetin_domain::error::MeetinError;
use meetin_domain::selection::{self, DEFAULT_MAX_DURATION};
use meetin_domain::service::ActuatorCommand;
use meetin_domain::time::{self, Timestamp};
use tokio_util::sync::CancellationToken;

use crate::ports::{Actuator, CalendarSource, Clock};
use crate::wait::{Wait, sleep_or_cancel};

/// Tunables of the scheduling loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Spacing of the wall-clock boundaries meetings start on.
    pub period: TimeDelta,
    /// How long before a boundary the calendar is queried.
    pub early_margin: TimeDelta,
    /// Width of the query window starting at the boundary.
    pub poll_window: TimeDelta,
    /// The light is turned off this long before the meeting ends.
    pub hold_margin: TimeDelta,
    /// Pause after a boundary with nothing to signal.
    pub idle_skip: Duration,
    /// Longer meetings are not signalled at all.
    pub max_event_duration: TimeDelta,
    /// Calendar to query.
    pub calendar_id: String,
    /// Light entity driven by the commands.
    pub entity_id: String,
    /// Brightness used when turning the light on.
    pub brightness: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: TimeDelta::minutes(30),
            early_margin: TimeDelta::seconds(10),
            poll_window: TimeDelta::seconds(1),
            hold_margin: TimeDelta::seconds(10),
            idle_skip: Duration::from_secs(11),
            max_event_duration: DEFAULT_MAX_DURATION,
            calendar_id: "primary".to_string(),
            entity_id: "light.meetin_ring".to_string(),
            brightness: 128,
        }
    }
}

/// Where an iteration currently stands.
#[derive(Debug)]
enum Phase {
    Aligning,
    Polling { boundary: Timestamp },
    WaitingForBoundary { boundary: Timestamp, events: Vec<Event> },
    Signaling { events: Vec<Event> },
    Holding { until: Timestamp },
    IdleSkip,
}

/// Drives the light from the calendar until cancelled.
///
/// Collaborators are injected already authenticated; the loop keeps no state
/// between runs.
pub struct SchedulerLoop<C, A, K> {
    calendar: C,
    actuator: A,
    clock: K,
    config: SchedulerConfig,
}

impl<C, A, K> SchedulerLoop<C, A, K>
where
    C: CalendarSource,
    A: Actuator,
    K: Clock,
{
    /// Create a new loop over the given collaborators.
    pub fn new(calendar: C, actuator: A, clock: K, config: SchedulerConfig) -> Self {
        Self {
            calendar,
            actuator,
            clock,
            config,
        }
    }

    /// Run until `cancel` is triggered.
    ///
    /// The light is turned off before the first poll and once more when
    /// cancellation is observed, whatever state the loop was in.
    ///
    /// # Errors
    ///
    /// Any calendar or actuator failure aborts the loop immediately without
    /// retry. A failure of the final `turn_off` is returned as well.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<(), MeetinError> {
        self.turn_off().await?;

        let mut last_polled: Option<Timestamp> = None;
        let mut phase = Phase::Aligning;
        while !cancel.is_cancelled() {
            match self.step(phase, &mut last_polled, cancel).await? {
                Some(next) => phase = next,
                None => break,
            }
        }

        tracing::info!("cancelled, turning light off");
        self.turn_off().await
    }

    /// Advance one state. `None` means cancellation was observed while waiting.
    async fn step(
        &self,
        phase: Phase,
        last_polled: &mut Option<Timestamp>,
        cancel: &CancellationToken,
    ) -> Result<Option<Phase>, MeetinError> {
        let next = match phase {
            Phase::Aligning => {
                let now = self.clock.now();
                let mut boundary = time::next_boundary(now, self.config.period)?;
                // A boundary is only ever polled once.
                if let Some(last) = last_polled.filter(|last| boundary <= *last) {
                    boundary = last + self.config.period;
                }
                let early = time::early_margin(boundary, self.config.early_margin);
                let wait = time::wait_for(now, early);
                if !wait.is_zero() {
                    tracing::info!(%boundary, wait_secs = wait.as_secs(), "sleeping until next poll");
                }
                if sleep_or_cancel(cancel, wait).await == Wait::Cancelled {
                    return Ok(None);
                }
                Phase::Polling { boundary }
            }
            Phase::Polling { boundary } => {
                *last_polled = Some(boundary);
                let raw = self
                    .calendar
                    .list_events(boundary, self.config.poll_window, &self.config.calendar_id)
                    .await?;
                let events = calendar::actionable(raw);
                if events.is_empty() {
                    tracing::debug!(%boundary, "no upcoming events");
                    Phase::Aligning
                } else {
                    Phase::WaitingForBoundary { boundary, events }
                }
            }
            Phase::WaitingForBoundary { boundary, events } => {
                let wait = time::wait_for(self.clock.now(), boundary);
                if sleep_or_cancel(cancel, wait).await == Wait::Cancelled {
                    return Ok(None);
                }
                Phase::Signaling { events }
            }
            Phase::Signaling { events } => self.signal(&events).await?,
            Phase::Holding { until } => {
                let wait = time::wait_for(self.clock.now(), until);
                if sleep_or_cancel(cancel, wait).await == Wait::Cancelled {
                    return Ok(None);
                }
                Phase::Aligning
            }
            Phase::IdleSkip => {
                if sleep_or_cancel(cancel, self.config.idle_skip).await == Wait::Cancelled {
                    return Ok(None);
                }
                Phase::Aligning
            }
        };
        Ok(Some(next))
    }

    async fn signal(&self, events: &[Event]) -> Result<Phase, MeetinError> {
        tracing::info!(count = events.len(), "upcoming events");
        for event in events {
            tracing::info!(
                summary = %event.summary,
                start = %event.start,
                duration_mins = event.duration().num_minutes(),
                "event"
            );
        }

        let Some(selected) = selection::select_event(events, self.config.max_event_duration) else {
            tracing::info!("no event short enough to signal, skipping boundary");
            return Ok(Phase::IdleSkip);
        };

        let signal = selected.signal();
        tracing::info!(%signal, end = %selected.end, "turning light on");
        // Setting the effect the light already shows is a no-op, so force an
        // off→on transition.
        self.turn_off().await?;
        self.actuator
            .invoke(&ActuatorCommand::turn_on(
                self.config.entity_id.as_str(),
                self.config.brightness,
                signal,
            ))
            .await?;

        Ok(Phase::Holding {
            until: selected.end - self.config.hold_margin,
        })
    }

    async fn turn_off(&self) -> Result<(), MeetinError> {
        self.actuator
            .invoke(&ActuatorCommand::turn_off(self.config.entity_id.as_str()))
            .await
    }
}
