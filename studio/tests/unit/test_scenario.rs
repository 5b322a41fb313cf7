//! End-to-end publish flow: create, upload, build, run, share

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sheetify::bundle::packager::ARCHIVE_NAME;
use sheetify::lifecycle::client::Deployed;

use crate::common::*;

async fn mount_get(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .and(header("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn test_demo_tool_from_create_to_share_url() {
    let server = MockServer::start().await;
    let state = signed_in_state(&server).await;

    // create and upload
    Mock::given(method("POST"))
        .and(path("/v1/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "name": "demo"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/tools/42/versions"))
        .and(header("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version_id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let deployed = state
        .create_session()
        .submit("demo", "", &app_bundle())
        .await
        .unwrap();
    assert_eq!(deployed, Deployed { tool_id: 42, version_id: 7 });

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/v1/tools/42/versions")
        .unwrap();
    assert!(contains(&upload.body, b"name=\"file\""));
    assert!(contains(&upload.body, ARCHIVE_NAME.as_bytes()));
    server.verify().await;

    // the new version is visible, nothing built yet
    server.reset().await;
    mount_get(&server, tool_json(42, None, json!([version_json(7, json!([]))]), json!([]))).await;
    Mock::given(method("POST"))
        .and(path("/v1/tools/42/build"))
        .and(body_json(json!({"version_id": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "queued"})))
        .expect(1)
        .mount(&server)
        .await;

    let view = state.tool_view(42);
    view.refresh().await.unwrap();
    let controls = view.controls();
    assert!(controls.can_build);
    assert!(!controls.can_run);
    assert!(view.trigger_run().await.is_err());

    view.trigger_build().await.unwrap();
    server.verify().await;

    // a poll sees the built image
    server.reset().await;
    let builds = json!([{
        "id": 11,
        "status": "success",
        "image_ref": "registry/tool-42:7",
        "created_at": "2024-05-01T10:02:00"
    }]);
    mount_get(
        &server,
        tool_json(42, Some("registry/tool-42:7"), json!([version_json(7, builds.clone())]), json!([])),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/v1/tools/42/run"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "starting"})))
        .expect(1)
        .mount(&server)
        .await;

    view.refresh().await.unwrap();
    assert!(view.controls().can_run);
    let ack = view.trigger_run().await.unwrap();
    assert_eq!(ack.status.as_deref(), Some("starting"));
    server.verify().await;

    // a later poll shows the run and its address
    server.reset().await;
    let runs = json!([
        {"id": 2, "status": "stopped", "url": "/t/42-2/"},
        {"id": 3, "status": "running", "url": "/t/42-3/"}
    ]);
    mount_get(
        &server,
        tool_json(42, Some("registry/tool-42:7"), json!([version_json(7, builds)]), runs),
    )
    .await;

    view.refresh().await.unwrap();
    let snapshot = view.snapshot();
    assert_eq!(snapshot.share_url.as_deref(), Some("http://tools.test/t/42-3/"));
    let tool = snapshot.tool.unwrap();
    assert_eq!(tool.current_image_ref.as_deref(), Some("registry/tool-42:7"));
}
