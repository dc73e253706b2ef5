//! Failures pass through untouched and never trigger a follow-up.

use super::common::adapter;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tastypie_api::sync::{ErrorKind, Operation, Resource, SyncConfig, SyncOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_validation_error_body_is_preserved() {
    let server = MockServer::start().await;
    let body = r#"{"entry": {"title": ["This field is required."]}}"#;

    Mock::given(method("POST"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(400).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let mut entry = adapter.config().model("/api/v1/entry/");
    let errors = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&errors);

    let err = adapter
        .save(
            &mut entry,
            SyncOptions::new()
                .on_success(|_| panic!("success callback must not fire"))
                .on_error(move |err| seen.lock().unwrap().push(err.status())),
        )
        .await
        .expect_err("Create should fail");

    assert!(matches!(err.kind, ErrorKind::Transport(_)));
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.response_text(), Some(body));
    assert_eq!(*errors.lock().unwrap(), vec![Some(400)]);
    assert!(entry.is_new());
}

#[tokio::test]
async fn test_server_error_message_is_readable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/entry/9/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error_message": "Sorry, this request could not be processed.",
            "traceback": "..."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let mut entry = adapter.config().model("/api/v1/entry/");
    entry.set("id", 9);

    let err = adapter
        .fetch(&mut entry, SyncOptions::new())
        .await
        .expect_err("Fetch should fail");

    assert_eq!(err.status(), Some(500));
    assert_eq!(
        err.transport_error().and_then(|e| e.error_message()).as_deref(),
        Some("Sorry, this request could not be processed.")
    );
}

#[tokio::test]
async fn test_unauthorized_create_is_not_followed_up() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let entry = adapter.config().model("/api/v1/entry/");

    let err = adapter
        .execute(Operation::Create, &entry, SyncOptions::new())
        .await
        .expect_err("Create should fail");

    assert_eq!(err.status(), Some(401));
    assert!(err.transport_error().is_some_and(|e| e.is_auth_error()));
}

#[tokio::test]
async fn test_follow_up_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", "/api/v1/entry/8/"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/entry/8/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let entry = adapter.config().model("/api/v1/entry/");

    let err = adapter
        .execute(Operation::Create, &entry, SyncOptions::new())
        .await
        .expect_err("Follow-up should fail");

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.response_text(), Some("Not found"));
}
