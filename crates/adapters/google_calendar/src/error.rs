//! Google Calendar adapter error types.

use std::path::PathBuf;

use meetin_domain::error::MeetinError;

/// Errors specific to the Google Calendar adapter.
#[derive(Debug, thiserror::Error)]
pub enum GoogleCalendarError {
    /// A credentials or token file could not be read.
    #[error("failed to read {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The token file could not be written.
    #[error("failed to cache oauth token in {}", path.display())]
    WriteToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credentials file is not a valid OAuth client JSON.
    #[error("unable to parse client secret file")]
    Credentials(#[source] serde_json::Error),

    /// The credentials file has neither an `installed` nor a `web` client.
    #[error("client secret file has no `installed` or `web` client")]
    MissingClient,

    /// The token file is not valid JSON.
    #[error("unable to parse token file")]
    Token(#[source] serde_json::Error),

    /// The token endpoint reported a lifetime that cannot be represented.
    #[error("token lifetime of {0} seconds is out of range")]
    TokenLifetime(i64),

    /// The access token expired and cannot be renewed.
    #[error("access token expired and no refresh token is available")]
    NoRefreshToken,

    /// Reading the authorization code from the terminal failed.
    #[error("unable to read authorization code")]
    Prompt(#[source] std::io::Error),

    /// A configured URL cannot be used as a request base.
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),

    /// The HTTP request failed or its body could not be decoded.
    #[error("calendar API request failed")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("calendar API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// An event carries a `dateTime` that is not RFC 3339.
    #[error("invalid event time {value:?}")]
    EventTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl From<GoogleCalendarError> for MeetinError {
    fn from(err: GoogleCalendarError) -> Self {
        MeetinError::calendar(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_missing_client_error() {
        assert_eq!(
            GoogleCalendarError::MissingClient.to_string(),
            "client secret file has no `installed` or `web` client"
        );
    }

    #[test]
    fn should_display_status_error_with_body() {
        let err = GoogleCalendarError::Status {
            status: reqwest::StatusCode::FORBIDDEN,
            body: "quota".to_string(),
        };
        assert_eq!(err.to_string(), "calendar API returned 403 Forbidden: quota");
    }

    #[test]
    fn should_display_read_file_error_with_path() {
        let err = GoogleCalendarError::ReadFile {
            path: PathBuf::from("credentials.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "failed to read credentials.json");
    }

    #[test]
    fn should_display_token_lifetime_error() {
        assert_eq!(
            GoogleCalendarError::TokenLifetime(-1).to_string(),
            "token lifetime of -1 seconds is out of range"
        );
    }

    #[test]
    fn should_convert_into_calendar_error() {
        let err: MeetinError = GoogleCalendarError::NoRefreshToken.into();
        assert!(matches!(err, MeetinError::Calendar(_)));
    }
}
