//! Model create/update/destroy against a mock tastypie server.

use super::common::{adapter, credentials, AUTHORIZATION, CSRF_TOKEN};
use serde_json::json;
use tastypie_api::sync::{Operation, Resource, SyncConfig, SyncOptions};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_follows_location_header() {
    let server = MockServer::start().await;
    let location = format!("{}/api/v1/entry/7/", server.uri());

    Mock::given(method("POST"))
        .and(path("/api/v1/entry/"))
        .and(header("Authorization", AUTHORIZATION))
        .and(header("X-CSRFToken", CSRF_TOKEN))
        .and(body_json(json!({"title": "Hello"})))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", location.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/entry/7/"))
        .and(header("Authorization", AUTHORIZATION))
        .and(header("X-CSRFToken", CSRF_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "title": "Hello",
            "slug": "hello",
            "resource_uri": "/api/v1/entry/7/"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, credentials().build());
    let mut entry = adapter.config().model("/api/v1/entry/");
    entry.set("title", "Hello");

    let response = adapter
        .save(&mut entry, SyncOptions::new())
        .await
        .expect("Create should succeed");

    assert!(response.followed_up);
    assert_eq!(response.url, location);
    assert_eq!(entry.id(), Some(&json!(7)));
    assert_eq!(entry.get("slug"), Some(&json!("hello")));
}

#[tokio::test]
async fn test_follow_up_sends_the_same_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", "/api/v1/entry/3/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/entry/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .mount(&server)
        .await;

    let adapter = adapter(&server, credentials().build());
    let mut entry = adapter.config().model("/api/v1/entry/");
    entry.set("title", "Headers");

    adapter
        .save(
            &mut entry,
            SyncOptions::new().header("X-Requested-With", "XMLHttpRequest"),
        )
        .await
        .expect("Create should succeed");

    let requests = server.received_requests().await.expect("Recording is enabled");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method.as_str(), "POST");
    assert_eq!(requests[1].method.as_str(), "GET");
    for name in ["authorization", "x-csrftoken", "x-requested-with"] {
        assert_eq!(
            requests[0].headers.get(name),
            requests[1].headers.get(name),
            "{name} differs between the two calls"
        );
        assert!(requests[1].headers.get(name).is_some(), "{name} missing");
    }
}

#[tokio::test]
async fn test_create_without_location_fetches_model_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    // An unsaved model's URL is the list endpoint; the first listed object wins.
    Mock::given(method("GET"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"limit": 20, "offset": 0, "total_count": 1},
            "objects": [{"id": 11, "title": "Listed"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let mut entry = adapter.config().model("/api/v1/entry/");
    entry.set("title", "Listed");

    adapter
        .save(&mut entry, SyncOptions::new())
        .await
        .expect("Create should succeed");

    assert_eq!(entry.id(), Some(&json!(11)));
}

#[tokio::test]
async fn test_create_with_body_is_not_followed_up() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 4, "title": "Inline"})))
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
    entry.set("title", "Inline");

    let response = adapter
        .save(&mut entry, SyncOptions::new())
        .await
        .expect("Create should succeed");

    assert!(!response.followed_up);
    assert_eq!(entry.id(), Some(&json!(4)));
}

// ============================================================================
// Update / delete
// ============================================================================

#[tokio::test]
async fn test_update_no_content_is_not_followed_up_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/entry/5/"))
        .respond_with(ResponseTemplate::new(204))
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
    entry.set("id", 5).set("title", "Edited");

    let response = adapter
        .save(&mut entry, SyncOptions::new())
        .await
        .expect("Update should succeed");

    assert_eq!(response.status, 204);
    assert_eq!(response.payload, None);
    assert_eq!(entry.get("title"), Some(&json!("Edited")));
}

#[tokio::test]
async fn test_update_follow_up_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/entry/5/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/entry/5/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "title": "Edited",
            "modified": "2024-01-01T00:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(
        &server,
        SyncConfig::builder().with_follow_up_on_update(true).build(),
    );
    let mut entry = adapter.config().model("/api/v1/entry/");
    entry.set("id", 5).set("title", "Edited");

    adapter
        .save(&mut entry, SyncOptions::new())
        .await
        .expect("Update should succeed");

    assert_eq!(entry.get("modified"), Some(&json!("2024-01-01T00:00:00")));
}

#[tokio::test]
async fn test_destroy_sends_delete() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/entry/5/"))
        .and(header("Authorization", AUTHORIZATION))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, credentials().build());
    let mut entry = adapter.config().model("/api/v1/entry/");
    entry.set("id", 5);

    let response = adapter
        .destroy(&entry, SyncOptions::new())
        .await
        .expect("Delete should succeed");

    assert_eq!(response.operation, Operation::Delete);
    assert_eq!(response.status, 204);
    assert_eq!(entry.url().as_deref(), Some("/api/v1/entry/5/"));
}

#[tokio::test]
async fn test_spawned_create_fires_success_callback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/entry/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let entry = adapter.config().model("/api/v1/entry/");
    let (tx, rx) = tokio::sync::oneshot::channel();

    let handle = adapter.spawn(
        Operation::Create,
        &entry,
        SyncOptions::new()
            .context(json!("spawned"))
            .on_success(move |response| {
                let _ = tx.send((response.payload.clone(), response.context.clone()));
            }),
    );

    let (payload, context) = rx.await.expect("Callback should fire");
    assert_eq!(payload, Some(json!({"id": 1})));
    assert_eq!(context, Some(json!("spawned")));
    assert!(handle.await.expect("Task should not panic").is_ok());
}
