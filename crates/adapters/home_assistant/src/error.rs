//! Home Assistant adapter error types.

use std::path::PathBuf;

use meetin_domain::error::MeetinError;

/// Errors specific to the Home Assistant adapter.
#[derive(Debug, thiserror::Error)]
pub enum HomeAssistantError {
    /// The API key file could not be read.
    #[error("failed to read API key from {}", path.display())]
    ApiKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The API key file is empty.
    #[error("API key file {} is empty", path.display())]
    EmptyApiKey { path: PathBuf },

    /// The configured host does not form a valid URL.
    #[error("invalid Home Assistant URL {0:?}")]
    InvalidUrl(String),

    /// The HTTP request failed or its body could not be decoded.
    #[error("Home Assistant request failed")]
    Http(#[from] reqwest::Error),

    /// Home Assistant answered with a non-success status.
    #[error("Home Assistant returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl From<HomeAssistantError> for MeetinError {
    fn from(err: HomeAssistantError) -> Self {
        MeetinError::actuator(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_status_error() {
        let err = HomeAssistantError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "401: Unauthorized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Home Assistant returned 401 Unauthorized: 401: Unauthorized"
        );
    }

    #[test]
    fn should_display_empty_key_with_path() {
        let err = HomeAssistantError::EmptyApiKey {
            path: PathBuf::from("api.key"),
        };
        assert_eq!(err.to_string(), "API key file api.key is empty");
    }

    #[test]
    fn should_convert_into_actuator_error() {
        let err: MeetinError = HomeAssistantError::InvalidUrl("x".to_string()).into();
        assert!(matches!(err, MeetinError::Actuator(_)));
    }
}
