//! Tests for the client: construction, version negotiation and OAuth

use super::*;
use crate::auth::{read_client_file, read_token_file, AppRegistration, LoginRequest};
use crate::version::Version;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_instance_version(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/instance/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uri": "example.social",
            "title": "Example",
            "version": version,
        })))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> crate::config::ClientConfigBuilder {
    ClientConfig::builder()
        .api_base_url(server.uri())
        .client("client-id", "client-secret")
}

// ============================================================================
// Construction
// ============================================================================

#[tokio::test]
async fn test_new_retrieves_version() {
    let server = MockServer::start().await;
    mount_instance_version(&server, "2.4.3rc1").await;

    let client = Mastodon::new(config_for(&server).build()).await.unwrap();
    assert_eq!(client.version(), Version::new(2, 4, 3));
    assert_eq!(client.api_base_url(), server.uri());
}

#[tokio::test]
async fn test_new_with_explicit_version_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/instance/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server).mastodon_version("2.1.0").build();
    let client = Mastodon::new(config).await.unwrap();
    assert_eq!(client.version(), Version::new(2, 1, 0));
}

#[tokio::test]
async fn test_new_rejects_bad_version() {
    let server = MockServer::start().await;
    let config = config_for(&server).mastodon_version("latest").build();

    let err = Mastodon::new(config).await.unwrap_err();
    match err {
        Error::Version { required } => assert_eq!(required, "Bad version specified"),
        other => panic!("expected version error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_version_falls_back_when_instance_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/instance/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "gone"})))
        .mount(&server)
        .await;

    let client = Mastodon::new(config_for(&server).build()).await.unwrap();
    assert_eq!(client.version(), Version::new(1, 0, 0));
}

#[tokio::test]
async fn test_verify_minimum_version() {
    let server = MockServer::start().await;
    mount_instance_version(&server, "2.1.0").await;

    let mut client = Mastodon::new(config_for(&server).build()).await.unwrap();
    assert!(client.verify_minimum_version("2.0.0").await.unwrap());
    assert!(client.verify_minimum_version("2.1.0").await.unwrap());
    assert!(!client.verify_minimum_version("2.2.0").await.unwrap());
    assert!(client.verify_minimum_version("two").await.is_err());
}

#[test]
fn test_supported_version_parses() {
    let supported = Version::parse(Mastodon::supported_version()).unwrap();
    assert_eq!(supported, Version::new(2, 2, 0));
}

// ============================================================================
// OAuth
// ============================================================================

async fn logged_out_client(server: &MockServer) -> Mastodon {
    let config = config_for(server).mastodon_version("2.4.0").build();
    Mastodon::new(config).await.unwrap()
}

#[tokio::test]
async fn test_auth_request_url() {
    let server = MockServer::start().await;
    let client = logged_out_client(&server).await;

    let url = client.auth_request_url(None, "urn:ietf:wg:oauth:2.0:oob", &["read", "write"]);
    assert_eq!(
        url,
        format!(
            "{}/oauth/authorize?client_id=client-id&response_type=code&redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob&scope=read+write",
            server.uri()
        )
    );

    let url = client.auth_request_url(Some("other"), "https://app.example/cb", &["read"]);
    assert!(url.contains("client_id=other"));
}

#[tokio::test]
async fn test_log_in_installs_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=me%40example.social"))
        .and(body_string_contains("client_id=client-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "token_type": "Bearer",
            "scope": "write read follow",
            "refresh_token": "refresh-me",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/verify_credentials"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1", "acct": "me"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let token_file = dir.path().join("usercred.secret");

    let mut client = logged_out_client(&server).await;
    let token = client
        .log_in(LoginRequest::password("me@example.social", "hunter2").to_file(&token_file))
        .await
        .unwrap();

    assert_eq!(token, "fresh-token");
    assert_eq!(read_token_file(&token_file).unwrap(), "fresh-token");
    assert_eq!(client.refresh_token(), Some("refresh-me"));
    assert!(!client.token_expired());

    let me = client.account_verify_credentials().await.unwrap();
    assert_eq!(me["acct"], Value::String("me".into()));
}

#[tokio::test]
async fn test_log_in_with_huge_expires_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "long-lived",
            "scope": "read write follow",
            "expires_in": 9_000_000_000_000_000_i64,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = logged_out_client(&server).await;
    let token = client.log_in(LoginRequest::password("a", "b")).await.unwrap();

    assert_eq!(token, "long-lived");
    assert!(!client.token_expired());
}

#[tokio::test]
async fn test_log_in_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let mut client = logged_out_client(&server).await;
    let err = client
        .log_in(LoginRequest::password("me", "wrong"))
        .await
        .unwrap_err();
    match err {
        Error::IllegalArgument { message } => {
            assert!(message.starts_with("Invalid user name, password, or redirect_uris"));
            assert!(message.contains("invalid_grant"));
        }
        other => panic!("expected illegal argument, got {other:?}"),
    }
}

#[tokio::test]
async fn test_log_in_scope_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "narrow-token",
            "scope": "read",
        })))
        .mount(&server)
        .await;

    let mut client = logged_out_client(&server).await;
    let err = client
        .log_in(LoginRequest::authorization_code("abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { status: 200, .. }));
    assert!(err.to_string().contains("differ from requested scopes"));
}

#[tokio::test]
async fn test_create_app_writes_client_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/apps"))
        .and(body_string_contains("client_name=tooter"))
        .and(body_string_contains("scopes=read+write+follow"))
        .and(body_string_contains("website=https%3A%2F%2Ftooter.example"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "9",
            "client_id": "new-id",
            "client_secret": "new-secret",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client_file = dir.path().join("clientcred.secret");
    let registration = AppRegistration::new("tooter")
        .website("https://tooter.example")
        .to_file(&client_file);

    let (id, secret) = Mastodon::create_app(&server.uri(), &registration, Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!((id.as_str(), secret.as_str()), ("new-id", "new-secret"));
    assert_eq!(
        read_client_file(&client_file).unwrap(),
        ("new-id".to_string(), "new-secret".to_string())
    );
}

#[tokio::test]
async fn test_create_app_unreachable() {
    let registration = AppRegistration::new("tooter");
    let err = Mastodon::create_app("http://127.0.0.1:1", &registration, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network { .. }));
}
