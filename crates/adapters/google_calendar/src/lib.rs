//! # meetin-adapter-google-calendar
//!
//! Google Calendar v3 REST adapter.
//!
//! Implements the [`CalendarSource`] port: queries the events of one
//! calendar over a short window, authenticated with a user OAuth2 token
//! that is cached on disk and renewed from its refresh token.
//!
//! ## Dependency rule
//! Depends on `meetin-domain` and `meetin-app` (for port traits).

mod config;
mod error;
mod oauth;
mod wire;

use std::path::PathBuf;

use chrono::{SecondsFormat, TimeDelta};
use meetin_app::ports::CalendarSource;
use meetin_domain::calendar::RawEvent;
use meetin_domain::error::MeetinError;
use meetin_domain::time::{self, Timestamp};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

pub use config::GoogleCalendarConfig;
pub use error::GoogleCalendarError;
pub use oauth::{ClientSecrets, Token};

/// Upper bound on events returned per query.
const MAX_RESULTS: &str = "10";

/// A calendar the user has access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInfo {
    pub id: String,
    pub summary: String,
}

/// Authenticated Calendar v3 client.
pub struct GoogleCalendar {
    http: reqwest::Client,
    api_base: Url,
    secrets: ClientSecrets,
    token_file: PathBuf,
    token: Mutex<Token>,
}

impl GoogleCalendar {
    /// Load the client secrets and the cached token.
    ///
    /// When no token is cached yet, runs the interactive authorization on
    /// the terminal and stores the result in `config.token_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials cannot be read, the cached token
    /// is corrupt, or the authorization fails.
    pub async fn connect(config: &GoogleCalendarConfig) -> Result<Self, GoogleCalendarError> {
        let secrets = ClientSecrets::from_file(&config.credentials_file)?;
        let http = reqwest::Client::new();
        let token = match oauth::load_token(&config.token_file)? {
            Some(token) => token,
            None => {
                let token = oauth::authorize_interactively(&http, &secrets).await?;
                tracing::info!(path = %config.token_file.display(), "saving oauth token");
                oauth::save_token(&config.token_file, &token)?;
                token
            }
        };
        Self::with_token(http, config, secrets, token)
    }

    /// Build a client around an already obtained token.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleCalendarError::InvalidUrl`] if `config.api_base` is
    /// not an absolute URL.
    pub fn with_token(
        http: reqwest::Client,
        config: &GoogleCalendarConfig,
        secrets: ClientSecrets,
        token: Token,
    ) -> Result<Self, GoogleCalendarError> {
        let api_base = Url::parse(&config.api_base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| GoogleCalendarError::InvalidUrl(config.api_base.clone()))?;
        Ok(Self {
            http,
            api_base,
            secrets,
            token_file: config.token_file.clone(),
            token: Mutex::new(token),
        })
    }

    /// List the single (expanded) events of `calendar_id` overlapping
    /// `[window_start, window_start + window)`, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or an event time is malformed.
    pub async fn events(
        &self,
        window_start: Timestamp,
        window: TimeDelta,
        calendar_id: &str,
    ) -> Result<Vec<RawEvent>, GoogleCalendarError> {
        let url = self.endpoint(&["calendars", calendar_id, "events"])?;
        let query = [
            ("showDeleted", "false".to_string()),
            ("singleEvents", "true".to_string()),
            ("timeMin", rfc3339(window_start)),
            ("timeMax", rfc3339(window_start + window)),
            ("maxResults", MAX_RESULTS.to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        let list: wire::EventList = self.get(url, &query).await?;
        list.items.into_iter().map(RawEvent::try_from).collect()
    }

    /// List every calendar in the user's calendar list.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails or the API answers with a
    /// non-success status.
    pub async fn list_calendars(&self) -> Result<Vec<CalendarInfo>, GoogleCalendarError> {
        let url = self.endpoint(&["users", "me", "calendarList"])?;
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let query: Vec<(&str, String)> = page_token
                .take()
                .map(|token| ("pageToken", token))
                .into_iter()
                .collect();
            let page: wire::CalendarList = self.get(url.clone(), &query).await?;
            calendars.extend(page.items.into_iter().map(|entry| CalendarInfo {
                id: entry.id,
                summary: entry.summary,
            }));
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => return Ok(calendars),
            }
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GoogleCalendarError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| GoogleCalendarError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Current access token, renewed first if it is about to expire.
    async fn access_token(&self) -> Result<String, GoogleCalendarError> {
        let mut token = self.token.lock().await;
        if token.is_expired(time::now()) {
            tracing::debug!("refreshing oauth token");
            let fresh = oauth::refresh(&self.http, &self.secrets, &token).await?;
            if let Err(err) = oauth::save_token(&self.token_file, &fresh) {
                tracing::warn!(error = %err, "failed to cache refreshed token");
            }
            *token = fresh;
        }
        Ok(token.access_token.clone())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, GoogleCalendarError> {
        let access_token = self.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleCalendarError::Status { status, body });
        }
        Ok(response.json().await?)
    }
}

fn rfc3339(at: Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl CalendarSource for GoogleCalendar {
    async fn list_events(
        &self,
        window_start: Timestamp,
        window: TimeDelta,
        calendar_id: &str,
    ) -> Result<Vec<RawEvent>, MeetinError> {
        let events = self.events(window_start, window, calendar_id).await?;
        tracing::debug!(count = events.len(), %window_start, "listed calendar events");
        Ok(events)
    }
}
