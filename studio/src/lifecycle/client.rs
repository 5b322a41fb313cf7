//! Lifecycle client: create, upload, build, run and stop against the backend

use std::sync::Arc;

use openapi_client::models::{ToolDetail, ToolId, TriggerAck, VersionId};
use tracing::{info, warn};

use crate::authn::store::CredentialStore;
use crate::bundle::Bundle;
use crate::errors::StudioError;
use crate::http::client::HttpClient;

/// Outcome of a successful create-and-deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployed {
    pub tool_id: ToolId,
    pub version_id: VersionId,
}

/// Issues lifecycle requests. Client-side preconditions that need no cached
/// state (a name, a credential) are checked here before any request is made.
pub struct LifecycleClient {
    http_client: Arc<HttpClient>,
    credentials: Arc<CredentialStore>,
}

impl LifecycleClient {
    pub fn new(http_client: Arc<HttpClient>, credentials: Arc<CredentialStore>) -> Self {
        Self {
            http_client,
            credentials,
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Create a tool and return its id
    pub async fn create(&self, name: &str, description: &str) -> Result<ToolId, StudioError> {
        if name.trim().is_empty() {
            return Err(StudioError::ValidationError("Tool name is required".to_string()));
        }
        let credential = self.credentials.require()?;

        let tool = self
            .http_client
            .create_tool(Some(&credential), name, description)
            .await?;
        info!("Created tool {} ({})", tool.id, tool.name);
        Ok(tool.id)
    }

    /// Upload a bundle as a new version of `tool_id`
    pub async fn upload_version(&self, tool_id: ToolId, bundle: &Bundle) -> Result<VersionId, StudioError> {
        let credential = self.credentials.require()?;

        let uploaded = self
            .http_client
            .upload_version(Some(&credential), tool_id, bundle)
            .await
            .map_err(|e| StudioError::UploadError {
                tool_id,
                source: Box::new(e),
            })?;
        info!("Uploaded version {} to tool {}", uploaded.version_id, tool_id);
        Ok(uploaded.version_id)
    }

    /// Queue a build of `version_id`. Returns once the backend accepted it.
    pub async fn trigger_build(&self, tool_id: ToolId, version_id: VersionId) -> Result<TriggerAck, StudioError> {
        let credential = self.credentials.require()?;

        let ack = self
            .http_client
            .trigger_build(Some(&credential), tool_id, version_id)
            .await
            .map_err(|e| StudioError::BuildTriggerError(Box::new(e)))?;
        info!(
            "Build of version {} queued for tool {} ({})",
            version_id,
            tool_id,
            ack.status.as_deref().unwrap_or("accepted")
        );
        Ok(ack)
    }

    /// Start the tool's current image
    pub async fn trigger_run(&self, tool_id: ToolId) -> Result<TriggerAck, StudioError> {
        let credential = self.credentials.require()?;

        let ack = self
            .http_client
            .trigger_run(Some(&credential), tool_id)
            .await
            .map_err(|e| StudioError::RunTriggerError(Box::new(e)))?;
        info!(
            "Run requested for tool {} ({})",
            tool_id,
            ack.status.as_deref().unwrap_or("accepted")
        );
        Ok(ack)
    }

    /// Stop any active run of the tool
    pub async fn trigger_stop(&self, tool_id: ToolId) -> Result<TriggerAck, StudioError> {
        let credential = self.credentials.require()?;

        let ack = self
            .http_client
            .trigger_stop(Some(&credential), tool_id)
            .await
            .map_err(|e| StudioError::StopTriggerError(Box::new(e)))?;
        info!(
            "Stop requested for tool {} ({})",
            tool_id,
            ack.status.as_deref().unwrap_or("accepted")
        );
        Ok(ack)
    }

    /// Fetch the full projection of a tool
    pub async fn fetch_tool(&self, tool_id: ToolId) -> Result<ToolDetail, StudioError> {
        let credential = self.credentials.require()?;
        self.http_client.get_tool(Some(&credential), tool_id).await
    }

    /// Create a tool, then upload its first version. The upload starts only
    /// after creation succeeded. When the upload fails the tool still exists;
    /// the error is an `UploadError` carrying its id so the upload alone can
    /// be retried.
    pub async fn create_and_deploy(
        &self,
        name: &str,
        description: &str,
        bundle: &Bundle,
    ) -> Result<Deployed, StudioError> {
        let tool_id = self.create(name, description).await?;

        match self.upload_version(tool_id, bundle).await {
            Ok(version_id) => Ok(Deployed { tool_id, version_id }),
            Err(e) => {
                warn!("Tool {} was created but its upload failed: {}", tool_id, e);
                match e {
                    StudioError::UploadError { .. } => Err(e),
                    other => Err(StudioError::UploadError {
                        tool_id,
                        source: Box::new(other),
                    }),
                }
            }
        }
    }
}
