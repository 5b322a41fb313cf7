//! Polling worker keeping a tool view in sync with the backend

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::authn::credential::Credential;
use crate::lifecycle::view::ToolView;

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between two fetch starts
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(4000),
        }
    }
}

/// Why the poller returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Shutdown,
    SignedOut,
    ViewClosed,
}

/// Run the poller worker.
///
/// Every tick starts one fetch in its own task and goes straight back to
/// sleeping, so a slow fetch never delays the next one. Before each tick the
/// view and the credential are checked; the loop ends once either is gone.
pub async fn run<S, F>(
    options: &Options,
    view: Arc<ToolView>,
    credentials: watch::Receiver<Option<Credential>>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) -> PollExit
where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Poller for tool {} starting...", view.tool_id());

    loop {
        if !view.is_active() {
            info!("Tool {} view closed, poller stopping", view.tool_id());
            return PollExit::ViewClosed;
        }
        if credentials.borrow().is_none() {
            info!("Signed out, poller for tool {} stopping", view.tool_id());
            return PollExit::SignedOut;
        }

        debug!("Polling tool {}...", view.tool_id());
        let fetch_view = view.clone();
        tokio::spawn(async move {
            if let Err(e) = fetch_view.refresh().await {
                warn!(
                    "Refresh of tool {} failed, keeping previous data: {}",
                    fetch_view.tool_id(),
                    e
                );
            }
        });

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Poller for tool {} shutting down...", view.tool_id());
                return PollExit::Shutdown;
            }
            _ = sleep_fn(options.interval) => {
                // Next tick
            }
        }
    }
}
