//! Calendar v3 JSON bodies and their conversion into domain events.

use chrono::{DateTime, Utc};
use meetin_domain::calendar::RawEvent;
use meetin_domain::time::Timestamp;
use serde::Deserialize;

use crate::error::GoogleCalendarError;

#[derive(Debug, Deserialize)]
pub(crate) struct EventList {
    #[serde(default)]
    pub items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventItem {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start: Option<EventDateTime>,
    #[serde(default)]
    pub end: Option<EventDateTime>,
}

/// Timed events carry `dateTime`, all-day events only `date`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventDateTime {
    #[serde(default)]
    pub date_time: Option<String>,
}

impl EventDateTime {
    fn instant(&self) -> Result<Option<Timestamp>, GoogleCalendarError> {
        match self.date_time.as_deref() {
            None | Some("") => Ok(None),
            Some(value) => DateTime::parse_from_rfc3339(value)
                .map(|at| Some(at.with_timezone(&Utc)))
                .map_err(|source| GoogleCalendarError::EventTime {
                    value: value.to_string(),
                    source,
                }),
        }
    }
}

fn instant(at: Option<&EventDateTime>) -> Result<Option<Timestamp>, GoogleCalendarError> {
    at.map_or(Ok(None), EventDateTime::instant)
}

impl TryFrom<EventItem> for RawEvent {
    type Error = GoogleCalendarError;

    fn try_from(item: EventItem) -> Result<Self, Self::Error> {
        Ok(Self {
            start: instant(item.start.as_ref())?,
            end: instant(item.end.as_ref())?,
            summary: item.summary,
            status: item.status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    #[serde(default, rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
}
