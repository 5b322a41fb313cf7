//! New-tool session: create-and-deploy behind its own in-flight flag

use std::sync::Arc;

use openapi_client::models::{ToolId, VersionId};

use crate::bundle::Bundle;
use crate::errors::StudioError;
use crate::lifecycle::client::{Deployed, LifecycleClient};
use crate::lifecycle::gate::OperationGate;

pub struct CreateSession {
    lifecycle: Arc<LifecycleClient>,
    gate: OperationGate,
}

impl CreateSession {
    pub fn new(lifecycle: Arc<LifecycleClient>) -> Self {
        Self {
            lifecycle,
            gate: OperationGate::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_in_flight()
    }

    /// Whether submitting would be accepted right now
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && self.lifecycle.credentials().is_signed_in()
    }

    /// Create the tool and upload its first version
    pub async fn submit(&self, name: &str, description: &str, bundle: &Bundle) -> Result<Deployed, StudioError> {
        let _guard = self.gate.try_begin()?;
        self.lifecycle.create_and_deploy(name, description, bundle).await
    }

    /// Upload again to a tool whose first upload failed
    pub async fn retry_upload(&self, tool_id: ToolId, bundle: &Bundle) -> Result<VersionId, StudioError> {
        let _guard = self.gate.try_begin()?;
        self.lifecycle.upload_version(tool_id, bundle).await
    }
}
