//! Request layer tests against a mock backend

use std::time::Duration;

use http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sheetify::errors::{StudioError, GENERIC_API_MESSAGE};
use sheetify::http::client::HttpClient;

use crate::common::*;

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tools"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "name required"})))
        .expect(1)
        .mount(&server)
        .await;

    let state = signed_in_state(&server).await;
    let err = state.lifecycle.create("demo", "").await.unwrap_err();

    let api = err.api_error().expect("api error");
    assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.user_message("Unable to create tool"), "name required");
}

#[tokio::test]
async fn test_unparseable_error_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tools"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let state = signed_in_state(&server).await;
    let err = state.lifecycle.create("demo", "").await.unwrap_err();

    assert_eq!(err.api_error().map(|e| e.detail.as_str()), Some(GENERIC_API_MESSAGE));
    assert_eq!(err.user_message("Unable to create tool"), "Unable to create tool");
}

#[tokio::test]
async fn test_bearer_attached_when_signed_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .and(header("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_json(42, None, json!([]), json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let state = signed_in_state(&server).await;
    let tool = state.lifecycle.fetch_tool(42).await.unwrap();
    assert_eq!(tool.id, 42);
    assert_eq!(tool.name, "demo");
}

#[tokio::test]
async fn test_register_omits_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "email": "a@b.c"})))
        .expect(1)
        .mount(&server)
        .await;

    let state = signed_out_state(&server).await;
    let user = state.http_client.register("a@b.c", "hunter2").await.unwrap();
    assert_eq!(user.email, "a@b.c");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_login_exchanges_form_for_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=a%40b.c"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh-token", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = signed_out_state(&server).await;
    let credential = state.http_client.login("a@b.c", "hunter2").await.unwrap();
    assert_eq!(credential.expose(), "fresh-token");
}

#[tokio::test]
async fn test_login_failure_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let state = signed_out_state(&server).await;
    let err = state.http_client.login("a@b.c", "wrong").await.unwrap_err();
    assert_eq!(err.user_message("Unable to authenticate"), "Incorrect email or password");
    assert!(!state.credentials.is_signed_in());
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tools/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let state = signed_in_state(&server).await;
    let err = state.lifecycle.fetch_tool(42).await.unwrap_err();
    assert!(matches!(err, StudioError::JsonError(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let client = HttpClient::new("http://127.0.0.1:1", Some(Duration::from_secs(2))).unwrap();
    let err = client.register("a@b.c", "hunter2").await.unwrap_err();
    assert!(matches!(err, StudioError::TransportError(_)));
    assert_eq!(err.user_message("Unable to register"), "Unable to register");
}
