//! Tests for the auth module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Credentials
// ============================================================================

#[test]
fn test_credentials_default_has_no_token() {
    let credentials = Credentials::new();
    assert_eq!(credentials.access_token(), None);
    assert_eq!(credentials.refresh_token(), None);
    assert_eq!(credentials.client_id, None);
}

#[test]
fn test_credentials_with_client_and_token() {
    let credentials = Credentials::with_token("abc").client("id", "secret");
    assert_eq!(credentials.access_token(), Some("abc"));
    assert_eq!(credentials.client_id.as_deref(), Some("id"));
    assert_eq!(credentials.client_secret.as_deref(), Some("secret"));
}

#[test]
fn test_token_expiry_tracking() {
    let mut credentials = Credentials::with_token("abc");

    credentials.set_token_expires_in(3600);
    assert!(!credentials.token_expired());

    credentials.set_token_expires_in(-1);
    assert!(credentials.token_expired());
}

#[test]
fn test_token_expiry_saturates() {
    let mut credentials = Credentials::with_token("abc");

    credentials.set_token_expires_in(i64::MAX);
    assert!(!credentials.token_expired());
    assert_eq!(credentials.token_expires_at(), chrono::DateTime::<chrono::Utc>::MAX_UTC);

    credentials.set_token_expires_in(i64::MIN);
    assert!(credentials.token_expired());
}

#[test]
fn test_debug_redacts_secrets() {
    let credentials = Credentials::with_token("very-secret-token").client("id", "client-secret");
    let debug = format!("{credentials:?}");
    assert!(!debug.contains("very-secret-token"));
    assert!(!debug.contains("client-secret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_apply_sets_bearer_header() {
    let client = reqwest::Client::new();
    let req = Credentials::with_token("abc")
        .apply(client.get("https://example.social/api/v1/lists"))
        .build()
        .unwrap();
    assert_eq!(req.headers()["authorization"], "Bearer abc");

    let req = Credentials::new()
        .apply(client.get("https://example.social/api/v1/lists"))
        .build()
        .unwrap();
    assert!(req.headers().get("authorization").is_none());
}

// ============================================================================
// Secret Files
// ============================================================================

#[test]
fn test_client_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clientcred.secret");

    write_client_file(&path, "client-id", "client-secret").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "client-id\nclient-secret\n");
    assert_eq!(
        read_client_file(&path).unwrap(),
        ("client-id".to_string(), "client-secret".to_string())
    );
}

#[test]
fn test_client_file_tolerates_crlf() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clientcred.secret");
    fs::write(&path, "id\r\nsecret\r\n").unwrap();

    assert_eq!(
        read_client_file(&path).unwrap(),
        ("id".to_string(), "secret".to_string())
    );
}

#[test]
fn test_client_file_needs_two_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clientcred.secret");
    fs::write(&path, "only-the-id\n").unwrap();

    let err = read_client_file(&path).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_token_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("usercred.secret");

    write_token_file(&path, "token-123").unwrap();
    assert_eq!(read_token_file(&path).unwrap(), "token-123");

    fs::write(&path, "\n").unwrap();
    assert!(matches!(read_token_file(&path), Err(Error::Config { .. })));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read_token_file(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_app_registration_defaults() {
    let registration = AppRegistration::new("tooter");
    assert_eq!(registration.scopes, vec!["read", "write", "follow"]);
    assert_eq!(registration.redirect_uris, DEFAULT_REDIRECT_URI);
    assert!(registration.website.is_none());
}

#[test]
fn test_login_request_grants() {
    let request = LoginRequest::password("me@example.social", "pw").scopes(["read"]);
    assert_eq!(request.grant.grant_type(), "password");
    assert_eq!(request.scopes, vec!["read"]);

    assert_eq!(
        LoginRequest::authorization_code("c").grant.grant_type(),
        "authorization_code"
    );
    assert_eq!(
        LoginRequest::refresh_token("r").grant.grant_type(),
        "refresh_token"
    );
}

#[test]
fn test_granted_scopes_sorted() {
    let token = TokenResponse {
        access_token: "t".into(),
        refresh_token: None,
        expires_in: None,
        scope: "write read  follow".into(),
    };
    assert_eq!(token.granted_scopes(), vec!["follow", "read", "write"]);
}
