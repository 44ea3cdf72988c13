//! OAuth2 plumbing: client secrets, cached user token, refresh and the
//! one-time interactive authorization.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use meetin_domain::time::Timestamp;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::GoogleCalendarError;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Read-only access to events and to the list of calendars.
pub const SCOPES: &str = "https://www.googleapis.com/auth/calendar.events.readonly \
                          https://www.googleapis.com/auth/calendar.calendarlist.readonly";

/// Tokens are renewed this long before they actually expire.
const EXPIRY_SLACK: TimeDelta = TimeDelta::seconds(30);

/// The OAuth client from a Google Cloud console credentials file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parse a credentials file (`installed` or `web` client).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or holds no client.
    pub fn from_json(raw: &str) -> Result<Self, GoogleCalendarError> {
        let file: CredentialsFile =
            serde_json::from_str(raw).map_err(GoogleCalendarError::Credentials)?;
        file.installed
            .or(file.web)
            .ok_or(GoogleCalendarError::MissingClient)
    }

    /// Read and parse a credentials file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, GoogleCalendarError> {
        let raw = std::fs::read_to_string(path).map_err(|source| GoogleCalendarError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    fn auth_uri(&self) -> &str {
        self.auth_uri.as_deref().unwrap_or(DEFAULT_AUTH_URI)
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map_or(OOB_REDIRECT_URI, String::as_str)
    }
}

/// A user token, stored as JSON in the token file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// A missing or pre-epoch expiry means the token never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Timestamp>,
}

impl Token {
    /// Whether the access token must be renewed before use at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry > DateTime::<Utc>::UNIX_EPOCH && expiry - EXPIRY_SLACK <= now)
    }

    fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(
        self,
        now: Timestamp,
        previous_refresh: Option<&str>,
    ) -> Result<Token, GoogleCalendarError> {
        let expiry = self
            .expires_in
            .map(|secs| {
                TimeDelta::try_seconds(secs)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .ok_or(GoogleCalendarError::TokenLifetime(secs))
            })
            .transpose()?;
        Ok(Token {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expiry,
        })
    }
}

/// Load the cached token, `None` if the file does not exist yet.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_token(path: &Path) -> Result<Option<Token>, GoogleCalendarError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(GoogleCalendarError::Token),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GoogleCalendarError::ReadFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write the token file, readable by the owner only.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_token(path: &Path, token: &Token) -> Result<(), GoogleCalendarError> {
    let write_err = |source| GoogleCalendarError::WriteToken {
        path: path.to_path_buf(),
        source,
    };
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options.open(path).map_err(write_err)?;
    serde_json::to_writer(file, token).map_err(|err| write_err(err.into()))
}

/// URL the user opens to grant offline, read-only access.
///
/// # Errors
///
/// Returns [`GoogleCalendarError::InvalidUrl`] if the client's auth URI is
/// malformed.
pub fn authorization_url(secrets: &ClientSecrets) -> Result<Url, GoogleCalendarError> {
    let mut url = Url::parse(secrets.auth_uri())
        .map_err(|_| GoogleCalendarError::InvalidUrl(secrets.auth_uri().to_string()))?;
    url.query_pairs_mut()
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", secrets.redirect_uri())
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPES)
        .append_pair("access_type", "offline")
        .append_pair("state", "state-token");
    Ok(url)
}

/// Trade an authorization code for a token.
///
/// # Errors
///
/// Returns an error if the token endpoint cannot be reached or refuses.
pub async fn exchange_code(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    code: &str,
) -> Result<Token, GoogleCalendarError> {
    let form = [
        ("code", code),
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("redirect_uri", secrets.redirect_uri()),
        ("grant_type", "authorization_code"),
    ];
    let response = request_token(http, secrets, &form).await?;
    response.into_token(meetin_domain::time::now(), None)
}

/// Obtain a fresh access token from `token`'s refresh token.
///
/// # Errors
///
/// Returns [`GoogleCalendarError::NoRefreshToken`] when `token` cannot be
/// refreshed, or an HTTP error from the token endpoint.
pub async fn refresh(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    token: &Token,
) -> Result<Token, GoogleCalendarError> {
    let refresh_token = token
        .refresh_token()
        .ok_or(GoogleCalendarError::NoRefreshToken)?;
    let form = [
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    let response = request_token(http, secrets, &form).await?;
    response.into_token(meetin_domain::time::now(), Some(refresh_token))
}

async fn request_token(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
    form: &[(&str, &str)],
) -> Result<TokenResponse, GoogleCalendarError> {
    let response = http.post(secrets.token_uri()).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GoogleCalendarError::Status { status, body });
    }
    Ok(response.json().await?)
}

/// Print the consent URL, read the code the user pastes back, exchange it.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or the exchange fails.
pub async fn authorize_interactively(
    http: &reqwest::Client,
    secrets: &ClientSecrets,
) -> Result<Token, GoogleCalendarError> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let url = authorization_url(secrets)?;
    println!("Go to the following URL in your browser then type the authorization code:\n{url}");
    let mut code = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut code)
        .await
        .map_err(GoogleCalendarError::Prompt)?;
    exchange_code(http, secrets, code.trim()).await
}
