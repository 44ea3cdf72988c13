//! End-to-end runs of the scheduler wired to the virtual adapters.
//!
//! Tokio time is paused and the scheduler's clock is derived from it, so a
//! whole morning of meetings plays out instantly.

use std::time::Duration;

use chrono::{TimeDelta, TimeZone, Utc};
use meetin_adapter_virtual::{LightState, ScriptedCalendar, VirtualLight};
use meetin_app::ports::Clock;
use meetin_app::scheduler::{SchedulerConfig, SchedulerLoop};
use meetin_domain::calendar::RawEvent;
use meetin_domain::selection::Signal;
use meetin_domain::service::{ActuatorCommand, Service};
use meetin_domain::time::Timestamp;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const ENTITY: &str = "light.meetin_ring";

struct PausedClock {
    origin: Timestamp,
    started: Instant,
}

impl Clock for PausedClock {
    fn now(&self) -> Timestamp {
        self.origin + TimeDelta::from_std(self.started.elapsed()).unwrap()
    }
}

fn at(h: u32, m: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2021, 6, 14, h, m, 0).unwrap()
}

fn meeting(summary: &str, start: Timestamp, end: Timestamp) -> RawEvent {
    RawEvent {
        summary: summary.to_string(),
        status: "confirmed".to_string(),
        start: Some(start),
        end: Some(end),
    }
}

/// Run from `start` until `duration` of paused time has elapsed.
async fn run_morning(
    calendar: &ScriptedCalendar,
    light: &VirtualLight,
    start: Timestamp,
    duration: Duration,
) {
    let clock = PausedClock {
        origin: start,
        started: Instant::now(),
    };
    let config = SchedulerConfig {
        entity_id: ENTITY.to_string(),
        ..SchedulerConfig::default()
    };
    let scheduler = SchedulerLoop::new(calendar, light, clock, config);
    let cancel = CancellationToken::new();

    let stop = async {
        tokio::time::sleep(duration).await;
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(scheduler.run(&cancel), stop);
    result.unwrap();
}

fn effects(light: &VirtualLight) -> Vec<Option<Signal>> {
    light
        .history()
        .iter()
        .filter(|command| command.service == Service::TurnOn)
        .map(|command| command.effect)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn should_signal_each_meeting_of_the_morning() {
    let calendar = ScriptedCalendar::new(vec![
        meeting("standup", at(9, 0), at(9, 15)),
        meeting("planning", at(10, 0), at(11, 0)),
        meeting("offsite", at(11, 30), at(15, 30)),
        RawEvent {
            summary: "cancelled sync".to_string(),
            status: "cancelled".to_string(),
            start: Some(at(12, 0)),
            end: Some(at(12, 30)),
        },
        meeting("review", at(12, 30), at(13, 0)),
    ]);
    let light = VirtualLight::new(ENTITY);

    run_morning(&calendar, &light, at(8, 45), Duration::from_secs(5 * 3600)).await;

    assert_eq!(
        effects(&light),
        vec![Some(Signal::HalfHour), Some(Signal::Hour), Some(Signal::HalfHour)]
    );
    assert_eq!(light.state(), LightState {
        on: false,
        brightness: Some(128),
        effect: Some(Signal::HalfHour),
    });
    assert_eq!(
        light.history().last(),
        Some(&ActuatorCommand::turn_off(ENTITY))
    );
}

#[tokio::test(start_paused = true)]
async fn should_query_each_boundary_once_with_one_second_window() {
    let calendar = ScriptedCalendar::default();
    let light = VirtualLight::new(ENTITY);

    run_morning(&calendar, &light, at(8, 45), Duration::from_secs(3600)).await;

    let queries = calendar.queries();
    let starts: Vec<Timestamp> = queries.iter().map(|q| q.window_start).collect();
    assert_eq!(starts, vec![at(9, 0), at(9, 30)]);
    assert!(queries.iter().all(|q| q.window == TimeDelta::seconds(1)));
    assert!(queries.iter().all(|q| q.calendar_id == "primary"));
    assert_eq!(
        light.history(),
        vec![ActuatorCommand::turn_off(ENTITY), ActuatorCommand::turn_off(ENTITY)]
    );
}

#[tokio::test(start_paused = true)]
async fn should_turn_light_off_when_interrupted_mid_meeting() {
    let calendar = ScriptedCalendar::new(vec![meeting("1:1", at(9, 0), at(10, 0))]);
    let light = VirtualLight::new(ENTITY);

    // Interrupted at 09:20, while the light is on.
    run_morning(&calendar, &light, at(8, 50), Duration::from_secs(30 * 60)).await;

    assert_eq!(
        light.history(),
        vec![
            ActuatorCommand::turn_off(ENTITY),
            ActuatorCommand::turn_off(ENTITY),
            ActuatorCommand::turn_on(ENTITY, 128, Signal::Hour),
            ActuatorCommand::turn_off(ENTITY),
        ]
    );
    assert!(!light.state().on);
}
