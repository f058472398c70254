//! Integration tests for bearer attachment and 401 refresh-and-retry

mod common;

use std::time::Duration;

use common::Harness;
use nurastays_core::api::{FilePart, RequestOptions};
use nurastays_core::auth::{MemoryTokenStore, TokenPair, TokenStore};
use nurastays_core::ApiError;
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const PROPERTIES: &str = "/api/admin/properties/";
const REFRESH: &str = "/api/admin/token/refresh/";
const LOGIN_PATH: &str = "/admin/login";

fn property_list() -> Value {
    json!([
        {"id": 1, "name": "Sunset Loft", "slug": "sunset-loft"},
        {"id": 2, "name": "Olive Cottage", "slug": "olive-cottage"}
    ])
}

#[tokio::test]
async fn attaches_bearer_header_when_token_stored() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_list()))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let result: Value = h.api.get("admin/properties/").await.expect("request should succeed");

    //* Then
    assert_eq!(result.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn sends_no_authorization_without_token() {
    //* Given
    let h = Harness::start(MemoryTokenStore::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/properties/featured/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_list()))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let featured = h.api.featured_properties().await.expect("request should succeed");

    //* Then
    assert_eq!(featured.len(), 2);
    let requests = h.requests_to("/api/properties/featured/").await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn refreshes_once_and_resends_with_new_token() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;

    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is invalid or expired"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_list()))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let page = h.api.admin_properties(None).await.expect("retry should succeed");

    //* Then
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].name, "Sunset Loft");
    assert_eq!(h.tokens.get_access().unwrap().as_deref(), Some("A2"));
    assert_eq!(h.tokens.get_refresh().unwrap().as_deref(), Some("R1"));
    assert_eq!(h.redirect.count(), 0);

    // The refresh call itself carries no bearer header
    let refresh_calls = h.requests_to(REFRESH).await;
    assert_eq!(refresh_calls.len(), 1);
    assert!(refresh_calls[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn fails_immediately_without_refresh_token() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_access("A1")).await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(0)
        .mount(&h.server)
        .await;

    //* When
    let result = h.api.admin_properties(None).await;

    //* Then
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(h.tokens.get_access().unwrap().as_deref(), Some("A1"));
    assert_eq!(h.tokens.get_refresh().unwrap(), None);
    assert_eq!(h.redirect.count(), 0);
}

#[tokio::test]
async fn second_401_is_not_refreshed_again() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let result = h.api.admin_properties(None).await;

    //* Then
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    let attempts = h.requests_to(PROPERTIES).await;
    assert_eq!(attempts[0].headers.get("authorization").unwrap(), "Bearer A1");
    assert_eq!(attempts[1].headers.get("authorization").unwrap(), "Bearer A2");
    assert_eq!(h.redirect.count(), 0);
}

#[tokio::test]
async fn failed_refresh_clears_tokens_and_redirects() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is blacklisted"})))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let result = h.api.admin_properties(None).await;

    //* Then
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(h.tokens.get_access().unwrap(), None);
    assert_eq!(h.tokens.get_refresh().unwrap(), None);
    assert_eq!(h.redirect.paths(), vec![LOGIN_PATH.to_string()]);
}

#[tokio::test]
async fn refresh_server_error_also_ends_session() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/dashboard/stats/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let result = h.api.dashboard_stats().await;

    //* Then
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert!(!h.tokens.has_tokens());
    assert_eq!(h.redirect.count(), 1);
}

#[tokio::test]
async fn server_errors_pass_through_without_refresh() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(0)
        .mount(&h.server)
        .await;

    //* When
    let result = h.api.admin_properties(None).await;

    //* Then
    match result {
        Err(ApiError::ServerError { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("expected server error, got {:?}", other),
    }
    assert_eq!(h.tokens.get_access().unwrap().as_deref(), Some("A1"));
}

#[tokio::test]
async fn server_error_keeps_its_status_code() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let err = h.api.admin_properties(None).await.unwrap_err();

    //* Then
    assert_eq!(err.status(), Some(503));
    assert!(matches!(err, ApiError::ServerError { status: 503, ref body } if body == "maintenance"));
    assert!(h.requests_to(REFRESH).await.is_empty());
}

#[tokio::test]
async fn client_errors_pass_through_without_refresh() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    Mock::given(method("GET"))
        .and(path("/api/properties/missing/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(0)
        .mount(&h.server)
        .await;

    //* When
    let result = h.api.property_by_slug("missing").await;

    //* Then
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn timeouts_surface_as_network_errors() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    let config = nurastays_core::Config {
        timeout_secs: 1,
        ..common::config_for(&h.server)
    };
    let api = nurastays_core::ApiClient::new(&config, h.tokens.clone())
        .unwrap()
        .with_redirect(h.redirect.clone());
    Mock::given(method("GET"))
        .and(path("/api/reviews/stats/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total_reviews": 0}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&h.server)
        .await;

    //* When
    let result = api.review_stats().await;

    //* Then
    match result {
        Err(ApiError::Network(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(h.redirect.count(), 0);
    assert!(h.tokens.has_tokens());
}

#[tokio::test]
async fn connection_failures_pass_through() {
    //* Given
    let tokens = std::sync::Arc::new(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1")));
    let config = nurastays_core::Config {
        api_url: "http://127.0.0.1:1/api".into(),
        timeout_secs: 2,
        ..nurastays_core::Config::default()
    };
    let api = nurastays_core::ApiClient::new(&config, tokens.clone()).unwrap();

    //* When
    let result = api.team().await;

    //* Then
    assert!(matches!(result, Err(ApiError::Network(_))));
    assert_eq!(tokens.get_access().unwrap().as_deref(), Some("A1"));
}

/// Keychain that cannot be unlocked: every read fails
struct LockedStore;

impl TokenStore for LockedStore {
    fn get_access(&self) -> anyhow::Result<Option<String>> {
        anyhow::bail!("keychain is locked")
    }

    fn get_refresh(&self) -> anyhow::Result<Option<String>> {
        anyhow::bail!("keychain is locked")
    }

    fn set_tokens(&self, _tokens: &TokenPair) -> anyhow::Result<()> {
        anyhow::bail!("keychain is locked")
    }

    fn set_access(&self, _access: &str) -> anyhow::Result<()> {
        anyhow::bail!("keychain is locked")
    }

    fn clear(&self) -> anyhow::Result<()> {
        anyhow::bail!("keychain is locked")
    }
}

#[tokio::test]
async fn unreadable_token_store_stops_the_request() {
    //* Given
    let server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PROPERTIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(property_list()))
        .expect(0)
        .mount(&server)
        .await;
    let api = nurastays_core::ApiClient::new(&common::config_for(&server), std::sync::Arc::new(LockedStore))
        .unwrap();

    //* When
    let result = api.admin_properties(None).await;

    //* Then
    match result {
        Err(ApiError::TokenStore(message)) => assert!(message.contains("keychain is locked")),
        other => panic!("expected token store error, got {:?}", other),
    }
    assert!(!api.tokens().has_tokens());
}

#[tokio::test]
async fn concurrent_expired_requests_refresh_independently() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    for route in ["/api/admin/reviews/", "/api/admin/team/"] {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", "Bearer A2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&h.server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(2)
        .mount(&h.server)
        .await;

    //* When
    let (reviews, team) = tokio::join!(h.api.admin_reviews(None), h.api.admin_team());

    //* Then
    assert!(reviews.expect("reviews should load").is_empty());
    assert!(team.expect("team should load").is_empty());
}

#[tokio::test]
async fn multipart_upload_is_rebuilt_for_the_resend() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_tokens(&TokenPair::new("A1", "R1"))).await;
    let images = "/api/admin/properties/7/images/";
    Mock::given(method("POST"))
        .and(path(images))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "A2"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(images))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"id": 31, "image": "/media/properties/pool.jpg", "is_primary": false, "order": 3}
        ])))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let uploaded = h
        .api
        .upload_property_images(
            7,
            vec![FilePart::new("ignored", "pool.jpg", "image/jpeg", b"jpeg-bytes".to_vec())],
        )
        .await
        .expect("upload should succeed after refresh");

    //* Then
    assert_eq!(uploaded.len(), 1);
    let attempts = h.requests_to(images).await;
    assert_eq!(attempts.len(), 2);
    for attempt in &attempts {
        let content_type = attempt.headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&attempt.body);
        assert!(body.contains("name=\"images\""));
        assert!(body.contains("jpeg-bytes"));
    }
}

#[tokio::test]
async fn caller_headers_survive_and_token_wins() {
    //* Given
    let h = Harness::start(MemoryTokenStore::with_access("A1")).await;
    Mock::given(method("GET"))
        .and(path("/api/team/"))
        .and(header("x-request-source", "cli"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    //* When
    let options = RequestOptions::new()
        .header(
            reqwest::header::HeaderName::from_static("x-request-source"),
            reqwest::header::HeaderValue::from_static("cli"),
        )
        .header(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_static("Bearer stale"),
        );
    let team: Vec<Value> = h
        .api
        .request(Method::GET, "team/", options)
        .await
        .expect("request should succeed");

    //* Then
    assert!(team.is_empty());
}
