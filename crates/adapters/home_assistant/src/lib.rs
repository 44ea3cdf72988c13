//! # meetin-adapter-home-assistant
//!
//! Home Assistant REST adapter.
//!
//! Implements the [`Actuator`] port by calling Home Assistant services
//! (`POST /api/services/{domain}/{service}`) with a long-lived access token.
//!
//! ## Dependency rule
//! Depends on `meetin-domain` and `meetin-app` (for port traits).

mod config;
mod error;

use meetin_app::ports::Actuator;
use meetin_domain::error::MeetinError;
use meetin_domain::service::ActuatorCommand;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use config::HomeAssistantConfig;
pub use error::HomeAssistantError;

/// Service domain used when none is configured.
pub const DEFAULT_SERVICE_DOMAIN: &str = "light";

/// Authenticated Home Assistant client.
#[derive(Debug)]
pub struct HomeAssistant {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    service_domain: String,
}

impl HomeAssistant {
    /// Read the API key and check that Home Assistant answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be read, or if `GET config` fails.
    pub async fn connect(config: &HomeAssistantConfig) -> Result<Self, HomeAssistantError> {
        let api_key = std::fs::read_to_string(&config.api_key_file).map_err(|source| {
            HomeAssistantError::ApiKey {
                path: config.api_key_file.clone(),
                source,
            }
        })?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(HomeAssistantError::EmptyApiKey {
                path: config.api_key_file.clone(),
            });
        }
        let client = Self::new(reqwest::Client::new(), &config.base_url(), api_key)?;

        let info: Value = client.get("config").await?;
        let version = info.get("version").and_then(Value::as_str).unwrap_or("unknown");
        let location = info.get("location_name").and_then(Value::as_str).unwrap_or("");
        tracing::info!(host = %config.host, version, location, "connected to home assistant");
        Ok(client)
    }

    /// Build a client without checking connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`HomeAssistantError::InvalidUrl`] if `base_url` is not an
    /// absolute URL.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> Result<Self, HomeAssistantError> {
        let base = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| HomeAssistantError::InvalidUrl(base_url.to_string()))?;
        Ok(Self {
            http,
            base,
            api_key: api_key.into(),
            service_domain: DEFAULT_SERVICE_DOMAIN.to_string(),
        })
    }

    /// Call actuator services in `domain` instead of `light`.
    #[must_use]
    pub fn with_service_domain(mut self, domain: impl Into<String>) -> Self {
        self.service_domain = domain.into();
        self
    }

    /// Current state object of an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the entity is unknown.
    pub async fn get_state(&self, entity_id: &str) -> Result<Map<String, Value>, HomeAssistantError> {
        self.get(&format!("states/{entity_id}")).await
    }

    /// Call a service and return the states it changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Home Assistant rejects it.
    pub async fn call_service(
        &self,
        domain: &str,
        service: &str,
        payload: &Map<String, Value>,
    ) -> Result<Vec<Value>, HomeAssistantError> {
        let url = self.url(&format!("services/{domain}/{service}"))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;
        let changed: Vec<Value> = decode(response).await?;
        if !changed.is_empty() {
            tracing::debug!(domain, service, changed = ?changed, "service changed states");
        }
        Ok(changed)
    }

    fn url(&self, path: &str) -> Result<Url, HomeAssistantError> {
        self.base
            .join(path)
            .map_err(|_| HomeAssistantError::InvalidUrl(format!("{}{path}", self.base)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HomeAssistantError> {
        let url = self.url(path)?;
        let response = self.http.get(url).bearer_auth(&self.api_key).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, HomeAssistantError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HomeAssistantError::Status { status, body });
    }
    Ok(response.json().await?)
}

impl Actuator for HomeAssistant {
    async fn invoke(&self, command: &ActuatorCommand) -> Result<(), MeetinError> {
        tracing::debug!(%command, "calling home assistant");
        self.call_service(&self.service_domain, command.action(), &command.payload())
            .await?;
        Ok(())
    }
}
