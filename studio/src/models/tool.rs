//! Derived views over a tool projection
//!
//! "Latest" always means greatest id. Nothing here is cached: every call walks
//! the collections of the projection it is given.

use openapi_client::models::{Build, Run, ToolDetail, ToolVersion};

/// Recency derivations on a fetched tool
pub trait ToolDetailExt {
    /// Version with the greatest id
    fn latest_version(&self) -> Option<&ToolVersion>;

    /// Build with the greatest id within the latest version
    fn latest_build(&self) -> Option<&Build>;

    /// Run with the greatest id
    fn latest_run(&self) -> Option<&Run>;

    /// Whether a built image is available to run
    fn has_image(&self) -> bool;

    /// Public address of the latest run: `tool_host` followed by the run's
    /// relative url
    fn share_url(&self, tool_host: &str) -> Option<String>;
}

impl ToolDetailExt for ToolDetail {
    fn latest_version(&self) -> Option<&ToolVersion> {
        self.versions.iter().max_by_key(|v| v.id)
    }

    fn latest_build(&self) -> Option<&Build> {
        self.latest_version()?.builds.iter().max_by_key(|b| b.id)
    }

    fn latest_run(&self) -> Option<&Run> {
        self.runs.iter().max_by_key(|r| r.id)
    }

    fn has_image(&self) -> bool {
        self.current_image_ref
            .as_deref()
            .is_some_and(|image| !image.is_empty())
    }

    fn share_url(&self, tool_host: &str) -> Option<String> {
        let url = self.latest_run()?.url.as_deref().filter(|u| !u.is_empty())?;
        Some(format!("{}{}", tool_host, url))
    }
}
