//! # meetind: meeting light daemon
//!
//! Composition root that wires the calendar and light adapters together and
//! runs the scheduling loop.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Initialise logging
//! - Connect to Google Calendar and Home Assistant, or build the virtual
//!   stand-ins for a dry run
//! - Run the scheduler until Ctrl-C or SIGTERM, then let it turn the light off
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no scheduling logic belongs here.

mod cli;
mod config;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use meetin_adapter_google_calendar::GoogleCalendar;
use meetin_adapter_home_assistant::HomeAssistant;
use meetin_adapter_virtual::{ScriptedCalendar, VirtualLight};
use meetin_app::ports::{Actuator, CalendarSource, SystemClock};
use meetin_app::scheduler::SchedulerLoop;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("meetind: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.path {
        std::env::set_current_dir(path)
            .with_context(|| format!("unable to change directory to {}", path.display()))?;
    }
    let config = Config::load(&cli).context("unable to load configuration")?;
    init_logging(&config.logging.filter);

    if config.integrations.virtual_enabled {
        tracing::info!(
            events = config.integrations.virtual_events.len(),
            "using virtual calendar and light"
        );
        let calendar = ScriptedCalendar::new(config.integrations.virtual_events.clone());
        if cli.list_calendars {
            println!("{}", config.scheduler.calendar_id);
            return Ok(());
        }
        let light = VirtualLight::new(config.light.entity_id.clone());
        return run_scheduler(calendar, light, &config).await;
    }

    let calendar = GoogleCalendar::connect(&config.google)
        .await
        .context("unable to retrieve calendar client")?;
    let calendars = calendar
        .list_calendars()
        .await
        .context("unable to list calendars")?;
    if cli.list_calendars {
        for entry in &calendars {
            println!("{}\t{}", entry.id, entry.summary);
        }
        return Ok(());
    }
    for entry in &calendars {
        tracing::info!(id = %entry.id, summary = %entry.summary, "calendar");
    }

    let light = HomeAssistant::connect(&config.home_assistant)
        .await
        .context("unable to connect to home assistant")?
        .with_service_domain(config.light.domain.clone());

    run_scheduler(calendar, light, &config).await
}

async fn run_scheduler<C, A>(calendar: C, light: A, config: &Config) -> anyhow::Result<()>
where
    C: CalendarSource,
    A: Actuator,
{
    // Installed only once the adapters are connected: until then an
    // interrupt keeps its default behaviour and ends the process, even while
    // blocked on the authorization prompt.
    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());
    drive(calendar, light, config, &cancel).await
}

async fn drive<C, A>(
    calendar: C,
    light: A,
    config: &Config,
    cancel: &CancellationToken,
) -> anyhow::Result<()>
where
    C: CalendarSource,
    A: Actuator,
{
    let scheduler_config = config.scheduler_config();
    tracing::info!(
        calendar_id = %scheduler_config.calendar_id,
        entity_id = %scheduler_config.entity_id,
        "meetind started"
    );
    SchedulerLoop::new(calendar, light, SystemClock, scheduler_config)
        .run(cancel)
        .await
        .context("scheduler stopped")
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("meetind: invalid log filter {filter:?} ({err}), using \"info\"");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                tracing::info!("interrupt received, shutting down");
                cancel.cancel();
            }
            Err(err) => tracing::warn!(error = %err, "unable to listen for interrupts"),
        }
    });
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
