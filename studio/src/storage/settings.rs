//! Settings file management

use serde::{Deserialize, Serialize};

use crate::errors::StudioError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Overrides `backend.base_url`
pub const API_URL_ENV: &str = "SHEETIFY_API_URL";

/// Overrides `tool_host`
pub const TOOL_HOST_ENV: &str = "SHEETIFY_TOOL_HOST";

/// Client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Host that run URLs are relative to
    #[serde(default = "default_tool_host")]
    pub tool_host: String,

    /// Tool view polling interval in milliseconds
    #[serde(default = "default_polling_interval")]
    pub polling_interval_ms: u64,

    /// Per-request timeout. Unset means the transport's own behaviour.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_tool_host() -> String {
    "http://localhost".to_string()
}

fn default_polling_interval() -> u64 {
    4000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            json_logs: false,
            backend: BackendSettings::default(),
            tool_host: default_tool_host(),
            polling_interval_ms: default_polling_interval(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Load settings from `file`, falling back to defaults when it is absent,
    /// then apply environment overrides.
    pub async fn load(file: &File) -> Result<Self, StudioError> {
        let settings: Settings = file.read_json_opt().await?.unwrap_or_default();
        let settings = settings.with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOOL_HOST_ENV).ok(),
        );
        settings.validate()?;
        Ok(settings)
    }

    /// Replace the API base URL and tool host where an override is given
    pub fn with_overrides(mut self, api_url: Option<String>, tool_host: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.backend.base_url = url;
        }
        if let Some(host) = tool_host.filter(|h| !h.trim().is_empty()) {
            self.tool_host = host;
        }
        self
    }

    /// Check that the configured URLs parse and the interval is usable
    pub fn validate(&self) -> Result<(), StudioError> {
        url::Url::parse(&self.backend.base_url).map_err(|e| {
            StudioError::ConfigError(format!("Invalid backend URL {}: {}", self.backend.base_url, e))
        })?;
        url::Url::parse(&self.tool_host).map_err(|e| {
            StudioError::ConfigError(format!("Invalid tool host {}: {}", self.tool_host, e))
        })?;
        if self.polling_interval_ms == 0 {
            return Err(StudioError::ConfigError(
                "polling_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL the `/v1` routes are mounted under
    #[serde(default = "default_backend_url")]
    pub base_url: String,
}

fn default_backend_url() -> String {
    "http://localhost/api".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
        }
    }
}
