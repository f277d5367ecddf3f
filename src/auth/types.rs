//! OAuth request and response types

use serde::Deserialize;
use std::path::PathBuf;

/// Redirect URI for out-of-band authorization
pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Scopes requested when the caller names none
pub const DEFAULT_SCOPES: &[&str] = &["read", "write", "follow"];

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect()
}

// ============================================================================
// App Registration
// ============================================================================

/// Parameters for registering a new application
#[derive(Debug, Clone)]
pub struct AppRegistration {
    pub client_name: String,
    pub scopes: Vec<String>,
    pub redirect_uris: String,
    pub website: Option<String>,
    /// Persist the returned id and secret as a two-line file
    pub to_file: Option<PathBuf>,
}

impl AppRegistration {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            scopes: default_scopes(),
            redirect_uris: DEFAULT_REDIRECT_URI.to_string(),
            website: None,
            to_file: None,
        }
    }

    #[must_use]
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn redirect_uris(mut self, uris: impl Into<String>) -> Self {
        self.redirect_uris = uris.into();
        self
    }

    #[must_use]
    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    #[must_use]
    pub fn to_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.to_file = Some(path.into());
        self
    }
}

// ============================================================================
// Login
// ============================================================================

/// OAuth grant used to obtain an access token
#[derive(Debug, Clone)]
pub enum Grant {
    /// Resource-owner password grant; the username is the account e-mail
    Password { username: String, password: String },
    /// Authorization code obtained through [`auth_request_url`](crate::Mastodon::auth_request_url)
    AuthorizationCode { code: String },
    RefreshToken { refresh_token: String },
}

impl Grant {
    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::Password { .. } => "password",
            Grant::AuthorizationCode { .. } => "authorization_code",
            Grant::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Prefix for errors raised when the grant is refused
    pub(crate) fn failure_context(&self) -> &'static str {
        match self {
            Grant::Password { .. } => "Invalid user name, password, or redirect_uris",
            Grant::AuthorizationCode { .. } => "Invalid access token or redirect_uris",
            Grant::RefreshToken { .. } => "Invalid request",
        }
    }
}

/// A token request
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub grant: Grant,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Persist the access token as a single-line file
    pub to_file: Option<PathBuf>,
}

impl LoginRequest {
    pub fn new(grant: Grant) -> Self {
        Self {
            grant,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: default_scopes(),
            to_file: None,
        }
    }

    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(Grant::Password {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn authorization_code(code: impl Into<String>) -> Self {
        Self::new(Grant::AuthorizationCode { code: code.into() })
    }

    pub fn refresh_token(refresh_token: impl Into<String>) -> Self {
        Self::new(Grant::RefreshToken {
            refresh_token: refresh_token.into(),
        })
    }

    #[must_use]
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    #[must_use]
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn to_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.to_file = Some(path.into());
        self
    }
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Space-separated granted scopes
    #[serde(default)]
    pub scope: String,
}

impl TokenResponse {
    /// Granted scopes, sorted
    pub fn granted_scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self.scope.split_whitespace().map(String::from).collect();
        scopes.sort();
        scopes
    }
}
