//! Application configuration options

use std::time::Duration;

use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::workers::poller;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Backend API base URL, without the `/v1` prefix
    pub backend_base_url: String,

    /// Host that a run's relative url is appended to
    pub tool_host: String,

    /// Per-request timeout; `None` leaves requests unbounded
    pub request_timeout: Option<Duration>,

    /// Storage layout paths
    pub layout: StorageLayout,

    /// Poller worker options
    pub poller: poller::Options,
}

impl AppOptions {
    /// Resolve runtime options from loaded settings
    pub fn from_settings(layout: StorageLayout, settings: &Settings) -> Self {
        Self {
            backend_base_url: settings.backend.base_url.clone(),
            tool_host: settings.tool_host.clone(),
            request_timeout: settings.request_timeout_secs.map(Duration::from_secs),
            layout,
            poller: poller::Options {
                interval: Duration::from_millis(settings.polling_interval_ms),
            },
        }
    }
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from_settings(StorageLayout::default(), &Settings::default())
    }
}
