//! Tool API client

use openapi_client::models::{
    BuildRequest, ToolCreate, ToolDetail, ToolId, ToolOut, TriggerAck, VersionId, VersionUploaded,
};
use reqwest::multipart;
use tracing::debug;

use crate::authn::credential::Credential;
use crate::bundle::Bundle;
use crate::errors::StudioError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Create a tool
    pub async fn create_tool(
        &self,
        credential: Option<&Credential>,
        name: &str,
        description: &str,
    ) -> Result<ToolOut, StudioError> {
        let body = ToolCreate {
            name: name.to_string(),
            description: description.to_string(),
        };
        self.post_json("/tools", credential, &body).await
    }

    /// Get the full projection of a tool
    pub async fn get_tool(
        &self,
        credential: Option<&Credential>,
        tool_id: ToolId,
    ) -> Result<ToolDetail, StudioError> {
        self.get(&format!("/tools/{}", tool_id), credential).await
    }

    /// Upload a bundle as a new version
    pub async fn upload_version(
        &self,
        credential: Option<&Credential>,
        tool_id: ToolId,
        bundle: &Bundle,
    ) -> Result<VersionUploaded, StudioError> {
        debug!(
            "Uploading {} ({} bytes, sha256 {}) to tool {}",
            bundle.filename(),
            bundle.len(),
            bundle.digest(),
            tool_id
        );
        let part = multipart::Part::bytes(bundle.bytes().to_vec())
            .file_name(bundle.filename().to_string())
            .mime_str(bundle.mime_type())?;
        let form = multipart::Form::new().part("file", part);

        self.post_multipart(&format!("/tools/{}/versions", tool_id), credential, form)
            .await
    }

    /// Queue a build of one version
    pub async fn trigger_build(
        &self,
        credential: Option<&Credential>,
        tool_id: ToolId,
        version_id: VersionId,
    ) -> Result<TriggerAck, StudioError> {
        let body = BuildRequest { version_id };
        self.post_json(&format!("/tools/{}/build", tool_id), credential, &body)
            .await
    }

    /// Start the tool's current image
    pub async fn trigger_run(
        &self,
        credential: Option<&Credential>,
        tool_id: ToolId,
    ) -> Result<TriggerAck, StudioError> {
        self.post_empty(&format!("/tools/{}/run", tool_id), credential)
            .await
    }

    /// Stop whatever the tool is running
    pub async fn trigger_stop(
        &self,
        credential: Option<&Credential>,
        tool_id: ToolId,
    ) -> Result<TriggerAck, StudioError> {
        self.post_empty(&format!("/tools/{}/stop", tool_id), credential)
            .await
    }
}
