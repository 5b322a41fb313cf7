//! Which lifecycle triggers a tool view currently allows

use openapi_client::models::ToolDetail;
use serde::Serialize;

use crate::models::tool::ToolDetailExt;

/// Enabled state of each trigger, derived from the cached projection and the
/// in-flight flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    /// Upload a new version
    pub can_upload: bool,

    /// Build needs a known version
    pub can_build: bool,

    /// Run needs a built image
    pub can_run: bool,

    /// Stop has no precondition
    pub can_stop: bool,
}

impl Controls {
    pub fn derive(tool: Option<&ToolDetail>, in_flight: bool) -> Self {
        let idle = !in_flight;
        Self {
            can_upload: idle,
            can_build: idle && tool.is_some_and(|t| t.latest_version().is_some()),
            can_run: idle && tool.is_some_and(|t| t.has_image()),
            can_stop: idle,
        }
    }

    /// Everything disabled
    pub fn none() -> Self {
        Self {
            can_upload: false,
            can_build: false,
            can_run: false,
            can_stop: false,
        }
    }
}
