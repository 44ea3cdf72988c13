//! Google Calendar integration configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the Google Calendar integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleCalendarConfig {
    /// OAuth client secrets downloaded from the Google Cloud console.
    pub credentials_file: PathBuf,
    /// Where the user's access/refresh token is stored.
    ///
    /// Created by the interactive authorization flow on first start.
    pub token_file: PathBuf,
    /// Base URL of the Calendar v3 REST API.
    pub api_base: String,
}

impl Default for GoogleCalendarConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}
