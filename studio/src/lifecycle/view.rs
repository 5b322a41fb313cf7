//! Tool view: the cached projection of one tool plus its gated triggers

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use openapi_client::models::{ToolDetail, ToolId, TriggerAck, VersionId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::bundle::Bundle;
use crate::errors::StudioError;
use crate::lifecycle::client::LifecycleClient;
use crate::lifecycle::controls::Controls;
use crate::lifecycle::gate::OperationGate;
use crate::models::tool::ToolDetailExt;

const REFRESH_FALLBACK: &str = "Unable to refresh tool";

/// Poll bookkeeping of a view
#[derive(Debug, Clone, Default)]
struct ViewState {
    tool: Option<ToolDetail>,
    /// Fetch that produced `tool`
    projection_seq: u64,
    /// Fetch that produced `last_error`
    error_seq: u64,
    last_synced_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Point-in-time copy of a view
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub tool: Option<ToolDetail>,
    pub controls: Controls,
    pub share_url: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,

    /// Message of the latest failed refresh, if it is newer than the data
    pub last_error: Option<String>,
}

impl ViewSnapshot {
    /// The data shown comes from before a failed refresh
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

/// One tool as seen by the client.
///
/// The cached projection only ever changes by applying a fetch result;
/// triggers never edit it. All triggers share one in-flight flag.
pub struct ToolView {
    tool_id: ToolId,
    lifecycle: Arc<LifecycleClient>,
    tool_host: String,
    gate: OperationGate,
    state: RwLock<ViewState>,
    issued_seq: AtomicU64,
    active: AtomicBool,
    updates: watch::Sender<u64>,
}

impl ToolView {
    pub fn new(tool_id: ToolId, lifecycle: Arc<LifecycleClient>, tool_host: impl Into<String>) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            tool_id,
            lifecycle,
            tool_host: tool_host.into(),
            gate: OperationGate::new(),
            state: RwLock::new(ViewState::default()),
            issued_seq: AtomicU64::new(0),
            active: AtomicBool::new(true),
            updates,
        }
    }

    pub fn tool_id(&self) -> ToolId {
        self.tool_id
    }

    /// Cached projection, if a fetch has succeeded
    pub fn tool(&self) -> Option<ToolDetail> {
        self.read_state().tool.clone()
    }

    pub fn controls(&self) -> Controls {
        Controls::derive(self.read_state().tool.as_ref(), self.gate.is_in_flight())
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_in_flight()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.read_state().clone();
        ViewSnapshot {
            controls: Controls::derive(state.tool.as_ref(), self.gate.is_in_flight()),
            share_url: state.tool.as_ref().and_then(|t| t.share_url(&self.tool_host)),
            tool: state.tool,
            last_synced_at: state.last_synced_at,
            last_error: state.last_error,
        }
    }

    /// Receives the sequence number of every applied fetch, failed ones included
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Tear the view down. Polling stops at its next tick and results of
    /// fetches still in flight are dropped.
    pub fn close(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, ViewState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    // ================================ RECONCILE ================================== //

    /// Fetch the projection once and apply it. On failure the previous
    /// projection stays in place and the error is recorded.
    pub async fn refresh(&self) -> Result<(), StudioError> {
        let seq = self.issued_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let result = self.lifecycle.fetch_tool(self.tool_id).await;
        let message = result.as_ref().err().map(|e| e.user_message(REFRESH_FALLBACK));
        self.apply(seq, result.as_ref().ok().cloned(), message);
        result.map(|_| ())
    }

    fn apply(&self, seq: u64, tool: Option<ToolDetail>, error: Option<String>) {
        if !self.is_active() {
            debug!("Tool {} view closed, dropping fetch #{}", self.tool_id, seq);
            return;
        }

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if seq <= state.projection_seq {
            debug!(
                "Dropping fetch #{} of tool {}, projection #{} already applied",
                seq, self.tool_id, state.projection_seq
            );
            return;
        }

        match tool {
            Some(tool) => {
                state.tool = Some(tool);
                state.projection_seq = seq;
                state.last_synced_at = Some(Utc::now());
                if state.error_seq < seq {
                    state.last_error = None;
                }
            }
            None => {
                if seq <= state.error_seq {
                    return;
                }
                state.error_seq = seq;
                state.last_error = error;
            }
        }
        drop(state);
        self.updates.send_replace(seq);
    }

    /// Re-request the projection after a successful trigger
    async fn revalidate(&self) {
        if let Err(e) = self.refresh().await {
            warn!("Refresh of tool {} after trigger failed: {}", self.tool_id, e);
        }
    }

    // ================================ TRIGGERS =================================== //

    /// Upload a bundle as a new version
    pub async fn upload_version(&self, bundle: &Bundle) -> Result<VersionId, StudioError> {
        let _guard = self.gate.try_begin()?;
        let version_id = self.lifecycle.upload_version(self.tool_id, bundle).await?;
        self.revalidate().await;
        Ok(version_id)
    }

    /// Build the latest known version. Rejected without a request when no
    /// version is known yet.
    pub async fn trigger_build(&self) -> Result<TriggerAck, StudioError> {
        let _guard = self.gate.try_begin()?;
        let version_id = self
            .read_state()
            .tool
            .as_ref()
            .and_then(|t| t.latest_version())
            .map(|v| v.id)
            .ok_or_else(|| StudioError::ValidationError("No version to build yet".to_string()))?;

        let ack = self.lifecycle.trigger_build(self.tool_id, version_id).await?;
        self.revalidate().await;
        Ok(ack)
    }

    /// Run the current image. Rejected without a request when the tool has
    /// no built image yet.
    pub async fn trigger_run(&self) -> Result<TriggerAck, StudioError> {
        let _guard = self.gate.try_begin()?;
        let has_image = self.read_state().tool.as_ref().is_some_and(|t| t.has_image());
        if !has_image {
            return Err(StudioError::ValidationError("No built image to run yet".to_string()));
        }

        let ack = self.lifecycle.trigger_run(self.tool_id).await?;
        self.revalidate().await;
        Ok(ack)
    }

    /// Stop the tool. Always permitted.
    pub async fn trigger_stop(&self) -> Result<TriggerAck, StudioError> {
        let _guard = self.gate.try_begin()?;
        let ack = self.lifecycle.trigger_stop(self.tool_id).await?;
        self.revalidate().await;
        Ok(ack)
    }
}
