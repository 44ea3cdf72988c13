//! Configuration loading: TOML file, then environment, then command line.
//!
//! Looks for `meetin.toml` in the working directory unless `--config` names
//! another file. Every field has a sensible default so the file is optional.

use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use meetin_adapter_google_calendar::GoogleCalendarConfig;
use meetin_adapter_home_assistant::{DEFAULT_SERVICE_DOMAIN, HomeAssistantConfig};
use meetin_app::scheduler::SchedulerConfig;
use meetin_domain::calendar::RawEvent;
use serde::Deserialize;

use crate::cli::Cli;

/// Default configuration file name.
pub const DEFAULT_PATH: &str = "meetin.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Boundary timing.
    pub scheduler: SchedulerSection,
    /// The light being driven.
    pub light: LightConfig,
    /// Home Assistant connection.
    pub home_assistant: HomeAssistantConfig,
    /// Google Calendar credentials.
    pub google: GoogleCalendarConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

/// Timing of the scheduling loop, in whole seconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Spacing of the boundaries meetings start on.
    pub period_secs: u32,
    /// How long before a boundary the calendar is queried.
    pub early_margin_secs: u32,
    /// Width of the query window.
    pub poll_window_secs: u32,
    /// The light goes off this long before the meeting ends.
    pub hold_margin_secs: u32,
    /// Pause after a boundary with nothing to signal.
    pub idle_skip_secs: u32,
    /// Longer meetings are ignored.
    pub max_event_minutes: u32,
    /// Calendar to watch.
    pub calendar_id: String,
}

/// Light entity configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub entity_id: String,
    pub brightness: u8,
    /// Home Assistant service domain, e.g. `light`.
    pub domain: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration toggles.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Replace Google Calendar and Home Assistant with in-memory stand-ins.
    pub virtual_enabled: bool,
    /// Agenda served by the scripted calendar.
    pub virtual_events: Vec<RawEvent>,
}

impl Config {
    /// Load the configuration file then apply environment and command-line
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if a file named with
    /// `--config` is missing, or if validation fails.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::from_optional_file(Path::new(DEFAULT_PATH))?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.apply_cli_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn from_optional_file(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MEETIN_HA_HOST") {
            self.home_assistant.host = val;
        }
        if let Some(val) = var("MEETIN_CALENDAR_ID") {
            self.scheduler.calendar_id = val;
        }
        if let Some(val) = var("MEETIN_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.ha_host {
            self.home_assistant.host.clone_from(host);
        }
        if let Some(calendar_id) = &cli.calendar_id {
            self.scheduler.calendar_id.clone_from(calendar_id);
        }
        if cli.quiet {
            self.logging.filter = "off".to_string();
        }
        if cli.dry_run {
            self.integrations.virtual_enabled = true;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let scheduler = &self.scheduler;
        if scheduler.period_secs == 0 {
            return Err(ConfigError::Validation("period must be non-zero".to_string()));
        }
        if scheduler.early_margin_secs >= scheduler.period_secs {
            return Err(ConfigError::Validation(
                "early margin must be shorter than the period".to_string(),
            ));
        }
        if scheduler.poll_window_secs == 0 {
            return Err(ConfigError::Validation(
                "poll window must be non-zero".to_string(),
            ));
        }
        if scheduler.max_event_minutes == 0 {
            return Err(ConfigError::Validation(
                "max event length must be non-zero".to_string(),
            ));
        }
        if scheduler.calendar_id.is_empty() {
            return Err(ConfigError::Validation("calendar id must not be empty".to_string()));
        }
        if self.light.entity_id.is_empty() {
            return Err(ConfigError::Validation("light entity id must not be empty".to_string()));
        }
        Ok(())
    }

    /// Scheduler settings derived from the `[scheduler]` and `[light]`
    /// sections.
    #[must_use]
    pub fn scheduler_config(&self) -> SchedulerConfig {
        let s = &self.scheduler;
        SchedulerConfig {
            period: TimeDelta::seconds(i64::from(s.period_secs)),
            early_margin: TimeDelta::seconds(i64::from(s.early_margin_secs)),
            poll_window: TimeDelta::seconds(i64::from(s.poll_window_secs)),
            hold_margin: TimeDelta::seconds(i64::from(s.hold_margin_secs)),
            idle_skip: Duration::from_secs(u64::from(s.idle_skip_secs)),
            max_event_duration: TimeDelta::minutes(i64::from(s.max_event_minutes)),
            calendar_id: s.calendar_id.clone(),
            entity_id: self.light.entity_id.clone(),
            brightness: self.light.brightness,
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            period_secs: 30 * 60,
            early_margin_secs: 10,
            poll_window_secs: 1,
            hold_margin_secs: 10,
            idle_skip_secs: 11,
            max_event_minutes: 60,
            calendar_id: "primary".to_string(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            entity_id: "light.meetin_ring".to_string(),
            brightness: 128,
            domain: DEFAULT_SERVICE_DOMAIN.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "meetind=info,meetin_app=info,meetin_adapter_google_calendar=info,\
                     meetin_adapter_home_assistant=info,meetin_adapter_virtual=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
