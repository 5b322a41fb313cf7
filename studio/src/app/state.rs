//! Application state management

use std::sync::Arc;

use openapi_client::models::ToolId;
use tracing::info;

use crate::app::options::AppOptions;
use crate::authn::store::CredentialStore;
use crate::errors::StudioError;
use crate::http::client::HttpClient;
use crate::lifecycle::client::LifecycleClient;
use crate::lifecycle::create::CreateSession;
use crate::lifecycle::view::ToolView;
use crate::storage::kv::{FileStore, KeyValueStore};

/// Main application state
pub struct AppState {
    /// HTTP client for backend communication
    pub http_client: Arc<HttpClient>,

    /// Signed-in session
    pub credentials: Arc<CredentialStore>,

    /// Lifecycle operations
    pub lifecycle: Arc<LifecycleClient>,

    /// Resolved options
    pub options: AppOptions,
}

impl AppState {
    /// Initialize application state with the credential persisted under the
    /// storage layout
    pub async fn init(options: AppOptions) -> Result<Self, StudioError> {
        let store_dir = options.layout.store_dir();
        store_dir.create().await?;
        Self::with_backend(options, Arc::new(FileStore::new(store_dir))).await
    }

    /// Initialize application state on top of a given durable store
    pub async fn with_backend(
        options: AppOptions,
        backend: Arc<dyn KeyValueStore>,
    ) -> Result<Self, StudioError> {
        info!("Initializing application state...");

        let http_client = Arc::new(HttpClient::new(
            &options.backend_base_url,
            options.request_timeout,
        )?);
        let credentials = Arc::new(CredentialStore::load(backend).await);
        let lifecycle = Arc::new(LifecycleClient::new(
            http_client.clone(),
            credentials.clone(),
        ));

        Ok(Self {
            http_client,
            credentials,
            lifecycle,
            options,
        })
    }

    /// Open a view of one tool
    pub fn tool_view(&self, tool_id: ToolId) -> Arc<ToolView> {
        Arc::new(ToolView::new(
            tool_id,
            self.lifecycle.clone(),
            self.options.tool_host.clone(),
        ))
    }

    /// Start a new-tool session
    pub fn create_session(&self) -> CreateSession {
        CreateSession::new(self.lifecycle.clone())
    }
}
