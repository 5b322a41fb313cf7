//! Error types for the Sheetify client

use http::StatusCode;
use openapi_client::models::ToolId;
use thiserror::Error;

/// Fallback shown when a failed response carries no usable `detail`
pub const GENERIC_API_MESSAGE: &str = "Request failed";

/// A non-2xx response from the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{detail}")]
pub struct ApiError {
    /// HTTP status of the response
    pub status: StatusCode,

    /// Message extracted from the response body, or the generic fallback
    pub detail: String,

    /// Whether `detail` came from the backend
    pub from_backend: bool,
}

impl ApiError {
    /// Build an error from a status and the raw response body
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        match extract_detail(body) {
            Some(detail) => Self {
                status,
                detail,
                from_backend: true,
            },
            None => Self {
                status,
                detail: GENERIC_API_MESSAGE.to_string(),
                from_backend: false,
            },
        }
    }

    /// The backend's message, if it sent one
    pub fn backend_detail(&self) -> Option<&str> {
        self.from_backend.then_some(self.detail.as_str())
    }
}

/// Pull a human-readable message out of a FastAPI error body
fn extract_detail(body: &str) -> Option<String> {
    let parsed: openapi_client::models::ErrorResponse = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Array(entries) => {
            let messages: Vec<String> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// Main error type for the Sheetify client
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    /// The request never reached the backend or never returned
    #[error("Transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A client-side precondition failed; no request was made
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A write was attempted without a credential; no request was made
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Another lifecycle operation of the same tool view is still in flight
    #[error("Another operation is already in progress")]
    Busy,

    /// Uploading a bundle failed. `tool_id` is the tool the upload targeted,
    /// which already exists server-side when this comes out of create-and-deploy.
    #[error("Upload to tool {tool_id} failed: {source}")]
    UploadError {
        tool_id: ToolId,
        #[source]
        source: Box<StudioError>,
    },

    #[error("Build trigger failed: {0}")]
    BuildTriggerError(#[source] Box<StudioError>),

    #[error("Run trigger failed: {0}")]
    RunTriggerError(#[source] Box<StudioError>),

    #[error("Stop trigger failed: {0}")]
    StopTriggerError(#[source] Box<StudioError>),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StudioError {
    /// The `ApiError` underneath this error, if the backend answered
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            StudioError::Api(e) => Some(e),
            StudioError::UploadError { source, .. }
            | StudioError::BuildTriggerError(source)
            | StudioError::RunTriggerError(source)
            | StudioError::StopTriggerError(source) => source.api_error(),
            _ => None,
        }
    }

    /// Tool that was already created when a create-and-deploy upload failed
    pub fn created_tool_id(&self) -> Option<ToolId> {
        match self {
            StudioError::UploadError { tool_id, .. } => Some(*tool_id),
            _ => None,
        }
    }

    /// Message to display for a failed action. Prefers the backend's `detail`,
    /// then client-side precondition messages, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.api_error().and_then(ApiError::backend_detail) {
            return detail.to_string();
        }
        match self {
            StudioError::ValidationError(msg) | StudioError::AuthError(msg) => msg.clone(),
            StudioError::Busy => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}
