//! Collection fetches: list envelopes, meta and set URLs.

use super::common::{adapter, credentials, AUTHORIZATION};
use serde_json::json;
use tastypie_api::sync::{SyncConfig, SyncOptions};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_list_envelope_with_meta() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/entry/"))
        .and(query_param("limit", "2"))
        .and(query_param("format", "json"))
        .and(header("Authorization", AUTHORIZATION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {
                "limit": 2,
                "offset": 0,
                "total_count": 5,
                "next": "/api/v1/entry/?limit=2&offset=2",
                "previous": null
            },
            "objects": [
                {"id": 1, "title": "First"},
                {"id": 2, "title": "Second"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(
        &server,
        credentials().with_default_query("format", "json").build(),
    );
    let mut entries = adapter.config().collection("/api/v1/entry/");

    adapter
        .fetch(&mut entries, SyncOptions::new().query("limit", "2"))
        .await
        .expect("Fetch should succeed");

    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries.get(&json!(2)).and_then(|m| m.get("title")),
        Some(&json!("Second"))
    );

    let meta = entries.list_meta().expect("Meta should be attached");
    assert_eq!(meta.total_count, Some(5));
    assert!(meta.has_next());
}

#[tokio::test]
async fn test_fetch_bare_array_keeps_previous_meta() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/entry/"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"limit": 20, "offset": 0, "total_count": 1},
            "objects": [{"id": 1}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/entry/"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let mut entries = adapter.config().collection("/api/v1/entry/");

    adapter
        .fetch(&mut entries, SyncOptions::new().query("offset", "0"))
        .await
        .expect("First fetch should succeed");
    adapter
        .fetch(&mut entries, SyncOptions::new().query("offset", "20"))
        .await
        .expect("Second fetch should succeed");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries.list_meta().and_then(|m| m.total_count), Some(1));
}

#[tokio::test]
async fn test_fetch_set_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/entry/set/1;3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [{"id": 1}, {"id": 3}],
            "not_found": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, SyncConfig::default());
    let mut entries = adapter.config().collection("/api/v1/entry/");
    let url = entries.set_url(["1", "3"]);
    assert_eq!(url, "/api/v1/entry/set/1;3/");

    adapter
        .fetch(&mut entries, SyncOptions::new().url(url))
        .await
        .expect("Set fetch should succeed");

    assert_eq!(entries.len(), 2);
    assert!(entries.meta().is_none());
}
