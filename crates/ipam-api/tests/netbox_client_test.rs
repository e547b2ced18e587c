#![allow(clippy::unwrap_used)]
// Integration tests for `NetBoxClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ipam_api::netbox::models::{NbPrefix, NbVlan};
use ipam_api::netbox::{NetBoxClient, Resource};
use ipam_api::{Error, RetryPolicy, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

async fn setup_with_retry(retry: RetryPolicy) -> (MockServer, NetBoxClient) {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        retry,
        ..TransportConfig::default()
    };
    let token = SecretString::from("0123456789abcdef".to_owned());
    let client = NetBoxClient::new(&format!("{}/api", server.uri()), &token, &transport).unwrap();
    (server, client)
}

async fn setup() -> (MockServer, NetBoxClient) {
    setup_with_retry(RetryPolicy::none()).await
}

fn vlan_json(id: u64, vid: u16, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "vid": vid,
        "name": name,
        "description": "",
        "group": null,
        "status": { "value": "active", "label": "Active" }
    })
}

// ── Listing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_token_and_limit() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .and(header("Authorization", "Token 0123456789abcdef"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "results": [vlan_json(3, 100, "servers")]
        })))
        .mount(&server)
        .await;

    let vlans: Vec<NbVlan> = client.list(Resource::Vlans, &[]).await.unwrap();

    assert_eq!(vlans.len(), 1);
    assert_eq!(vlans[0].vid, 100);
    assert_eq!(vlans[0].name, "servers");
}

#[tokio::test]
async fn test_undecodable_body_with_multibyte_text_is_an_error() {
    let (server, client) = setup().await;
    // The preview cut lands inside the two-byte 'é'.
    let body = format!("{}é not json", "x".repeat(199));

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let result: Result<Vec<NbVlan>, Error> = client.list(Resource::Vlans, &[]).await;
    match result {
        Err(Error::Deserialization { message, body }) => {
            assert!(message.contains("body preview"), "{message}");
            assert!(body.ends_with("é not json"));
        }
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_follows_next_links() {
    let (server, client) = setup().await;
    let next = format!("{}/api/ipam/prefixes/?limit=1000&offset=1000", server.uri());

    Mock::given(method("GET"))
        .and(path("/api/ipam/prefixes/"))
        .and(query_param("offset", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "results": [{ "id": 2, "prefix": "10.1.0.0/24" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/prefixes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": next,
            "results": [{ "id": 1, "prefix": "10.0.0.0/24", "vrf": { "id": 4, "name": "blue" } }]
        })))
        .mount(&server)
        .await;

    let prefixes: Vec<NbPrefix> = client.list(Resource::Prefixes, &[]).await.unwrap();

    let ids: Vec<u64> = prefixes.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(prefixes[0].vrf.as_ref().map(|r| r.id()), Some(4));
}

#[tokio::test]
async fn test_list_passes_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/vlans/"))
        .and(query_param("vid", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 0, "next": null, "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vlans: Vec<NbVlan> = client
        .list(Resource::Vlans, &[("vid", "100".to_owned())])
        .await
        .unwrap();
    assert!(vlans.is_empty());
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_posts_body() {
    let (server, client) = setup().await;
    let body = json!({ "vid": 100, "name": "servers", "group": null });

    Mock::given(method("POST"))
        .and(path("/api/ipam/vlans/"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(vlan_json(42, 100, "servers")))
        .expect(1)
        .mount(&server)
        .await;

    let created: NbVlan = client.create(Resource::Vlans, &body).await.unwrap();
    assert_eq!(created.id, 42);
}

#[tokio::test]
async fn test_create_rejects_200() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/ipam/vlans/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "results": [] })))
        .mount(&server)
        .await;

    let result: Result<NbVlan, Error> = client.create(Resource::Vlans, &json!({})).await;
    assert!(
        matches!(result, Err(Error::UnexpectedResponse { .. })),
        "expected UnexpectedResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn test_update_puts_to_object_url() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/ipam/vlans/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vlan_json(42, 100, "renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let updated: NbVlan = client
        .update(Resource::Vlans, 42, &json!({ "vid": 100, "name": "renamed" }))
        .await
        .unwrap();
    assert_eq!(updated.name, "renamed");
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_validation_error_renders_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/ipam/prefixes/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "prefix": ["Enter a valid prefix."] })),
        )
        .mount(&server)
        .await;

    let result: Result<NbPrefix, Error> = client.create(Resource::Prefixes, &json!({})).await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("prefix: Enter a valid prefix."), "{message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/vrfs/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "detail": "Invalid token" })))
        .mount(&server)
        .await;

    let result: Result<Vec<serde_json::Value>, Error> = client.list(Resource::Vrfs, &[]).await;
    assert!(
        matches!(&result, Err(Error::Authentication { message }) if message.contains("Invalid token")),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Retry ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_retries_server_errors() {
    let (server, client) = setup_with_retry(fast_retry(3)).await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/roles/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/roles/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "results": [{ "id": 1, "name": "Production", "slug": "production", "weight": 1000 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let roles: Vec<serde_json::Value> = client.list(Resource::Roles, &[]).await.unwrap();
    assert_eq!(roles.len(), 1);
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let (server, client) = setup_with_retry(fast_retry(2)).await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/roles/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let result: Result<Vec<serde_json::Value>, Error> = client.list(Resource::Roles, &[]).await;
    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_does_not_retry_client_errors() {
    let (server, client) = setup_with_retry(fast_retry(3)).await;

    Mock::given(method("PUT"))
        .and(path("/api/ipam/vlans/9/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .expect(1)
        .mount(&server)
        .await;

    let result: Result<NbVlan, Error> = client.update(Resource::Vlans, 9, &json!({})).await;
    let err = result.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_transient());
}
