//! Home Assistant integration configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the Home Assistant integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HomeAssistantConfig {
    /// Host and port of the Home Assistant instance.
    pub host: String,
    /// File holding a long-lived access token.
    pub api_key_file: PathBuf,
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            host: "homeassistant:8123".to_string(),
            api_key_file: PathBuf::from("api.key"),
        }
    }
}

impl HomeAssistantConfig {
    /// Root of the REST API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.host)
    }
}
