//! API models

use serde::{Deserialize, Serialize};

/// Tool identifier
pub type ToolId = i64;

/// Version identifier
pub type VersionId = i64;

/// Build identifier
pub type BuildId = i64;

/// Run identifier
pub type RunId = i64;

/// Account registration request (`POST /v1/auth/register`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
}

/// Token exchange form (`POST /v1/auth/token`), sent form-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Token exchange response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Tool creation request (`POST /v1/tools`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCreate {
    pub name: String,
    pub description: String,
}

/// Tool as returned by the creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOut {
    pub id: ToolId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_image_ref: Option<String>,
}

/// Response of a bundle upload (`POST /v1/tools/{id}/versions`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionUploaded {
    pub version_id: VersionId,
}

/// Build trigger request (`POST /v1/tools/{id}/build`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub version_id: VersionId,
}

/// Acknowledgement returned by the build, run and stop triggers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerAck {
    #[serde(default)]
    pub status: Option<String>,
}

/// A build attempt against one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    /// Opaque backend status ("pending", "running", ...)
    pub status: String,
    #[serde(default)]
    pub logs: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub created_at: String,
}

/// One uploaded bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVersion {
    pub id: VersionId,
    #[serde(default)]
    pub tool_id: Option<ToolId>,
    pub created_at: String,
    #[serde(default)]
    pub builds: Vec<Build>,
}

/// One execution of a built image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    /// Opaque backend status
    pub status: String,
    /// Path relative to the tool host
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub logs: Option<String>,
}

/// Full tool projection (`GET /v1/tools/{id}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDetail {
    pub id: ToolId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    /// Opaque backend status ("idle", "building", ...)
    pub status: String,
    #[serde(default)]
    pub current_image_ref: Option<String>,
    #[serde(default)]
    pub versions: Vec<ToolVersion>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

/// Error body returned by the backend. `detail` is a string for handled
/// errors and a list of validation entries for request validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}
