//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

/// Turn a light on ahead of the meetings in your calendar.
#[derive(Parser, Debug, Default)]
#[command(name = "meetind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path (defaults to `meetin.toml` if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Disable logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Home Assistant host and port
    #[arg(long)]
    pub ha_host: Option<String>,

    /// Google Calendar ID to watch
    #[arg(long)]
    pub calendar_id: Option<String>,

    /// Directory holding the credential files; changed into before loading
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Print the accessible calendars and exit
    #[arg(long)]
    pub list_calendars: bool,

    /// Use the scripted calendar and the virtual light
    #[arg(long)]
    pub dry_run: bool,
}
