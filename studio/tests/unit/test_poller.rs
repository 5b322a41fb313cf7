//! Polling worker and fetch reconciliation tests

use std::time::Duration;

use serde_json::json;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sheetify::app::state::AppState;
use sheetify::lifecycle::view::ToolView;
use sheetify::workers::poller::{self, PollExit};

use crate::common::*;

async fn mount_tool(server: &MockServer, name: &str) {
    let mut body = tool_json(42, None, json!([]), json!([]));
    body["name"] = json!(name);
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn spawn_poller(
    state: &AppState,
    view: std::sync::Arc<ToolView>,
    shutdown: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<PollExit> {
    let options = state.options.poller.clone();
    let credentials = state.credentials.subscribe();
    tokio::spawn(async move {
        poller::run(
            &options,
            view,
            credentials,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown.await;
            }),
        )
        .await
    })
}

async fn join(handle: tokio::task::JoinHandle<PollExit>) -> PollExit {
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("poller did not stop")
        .unwrap()
}

#[tokio::test]
async fn test_poller_fills_view_and_stops_on_sign_out() {
    let server = MockServer::start().await;
    mount_tool(&server, "demo").await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = spawn_poller(&state, view.clone(), shutdown_rx);

    eventually(|| view.tool().is_some()).await;
    assert!(view.snapshot().last_synced_at.is_some());

    state.credentials.set(None).await.unwrap();
    assert_eq!(join(handle).await, PollExit::SignedOut);
}

#[tokio::test]
async fn test_poller_stops_when_view_closes() {
    let server = MockServer::start().await;
    mount_tool(&server, "demo").await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = spawn_poller(&state, view.clone(), shutdown_rx);

    eventually(|| view.tool().is_some()).await;
    view.close();
    assert_eq!(join(handle).await, PollExit::ViewClosed);
}

#[tokio::test]
async fn test_poller_stops_on_shutdown() {
    let server = MockServer::start().await;
    mount_tool(&server, "demo").await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = spawn_poller(&state, view.clone(), shutdown_rx);

    shutdown_tx.send(()).unwrap();
    assert_eq!(join(handle).await, PollExit::Shutdown);
}

#[tokio::test]
async fn test_poller_never_fetches_when_signed_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = signed_out_state(&server).await;
    let view = state.tool_view(42);
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = spawn_poller(&state, view, shutdown_rx);
    assert_eq!(join(handle).await, PollExit::SignedOut);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_projection() {
    let server = MockServer::start().await;
    mount_tool(&server, "demo").await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);
    view.refresh().await.unwrap();
    assert!(!view.snapshot().is_stale());

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "maintenance"})))
        .mount(&server)
        .await;

    assert!(view.refresh().await.is_err());
    let snapshot = view.snapshot();
    assert_eq!(snapshot.tool.as_ref().map(|t| t.name.as_str()), Some("demo"));
    assert_eq!(snapshot.last_error.as_deref(), Some("maintenance"));
    assert!(snapshot.is_stale());

    // a later success clears the stale marker
    server.reset().await;
    mount_tool(&server, "demo v2").await;
    view.refresh().await.unwrap();
    let snapshot = view.snapshot();
    assert_eq!(snapshot.tool.as_ref().map(|t| t.name.as_str()), Some("demo v2"));
    assert!(snapshot.last_error.is_none());
}

#[tokio::test]
async fn test_older_fetch_result_is_dropped() {
    let server = MockServer::start().await;
    let mut slow = tool_json(42, None, json!([]), json!([]));
    slow["name"] = json!("slow");
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(slow)
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_tool(&server, "fast").await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);

    let first = tokio::spawn({
        let view = view.clone();
        async move { view.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    view.refresh().await.unwrap();
    assert_eq!(view.tool().map(|t| t.name), Some("fast".to_string()));

    first.await.unwrap().unwrap();
    assert_eq!(view.tool().map(|t| t.name), Some("fast".to_string()));
}

#[tokio::test]
async fn test_result_after_close_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tool_json(42, None, json!([]), json!([])))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);
    let mut updates = view.subscribe();

    let pending = tokio::spawn({
        let view = view.clone();
        async move { view.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    view.close();

    pending.await.unwrap().unwrap();
    assert!(view.tool().is_none());
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test]
async fn test_late_success_survives_newer_failure() {
    let server = MockServer::start().await;
    let mut slow = tool_json(42, None, json!([]), json!([]));
    slow["name"] = json!("slow");
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(slow)
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "blip"})))
        .mount(&server)
        .await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);

    let first = tokio::spawn({
        let view = view.clone();
        async move { view.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(view.refresh().await.is_err());
    assert!(view.tool().is_none());

    first.await.unwrap().unwrap();
    let snapshot = view.snapshot();
    assert_eq!(snapshot.tool.as_ref().map(|t| t.name.as_str()), Some("slow"));
    assert!(snapshot.last_synced_at.is_some());
    assert_eq!(snapshot.last_error.as_deref(), Some("blip"));
}

#[tokio::test]
async fn test_slow_fetch_does_not_delay_next_tick() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tool_json(42, None, json!([]), json!([])))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let state = signed_in_state(&server).await;
    let view = state.tool_view(42);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = spawn_poller(&state, view.clone(), shutdown_rx);

    // several ticks of 20 ms fit before the first response is due
    tokio::time::sleep(Duration::from_millis(250)).await;
    let started = server.received_requests().await.unwrap().len();
    assert!(started >= 3, "only {started} fetches started");
    assert!(view.tool().is_none());

    shutdown_tx.send(()).unwrap();
    assert_eq!(join(handle).await, PollExit::Shutdown);
}
