//! Client credentials and the flat files they live in
//!
//! Client files hold the client id on the first line and the secret on the
//! second. Token files hold a single access token line.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::RequestBuilder;
use std::fmt;
use std::fs;
use std::path::Path;

/// Credentials owned by one client
#[derive(Clone)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    token_expires_at: DateTime<Utc>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            access_token: None,
            refresh_token: None,
            token_expires_at: Utc::now(),
        }
    }
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credentials holding just a bearer token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn client(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn set_refresh_token(&mut self, token: Option<String>) {
        self.refresh_token = token;
    }

    pub fn token_expires_at(&self) -> DateTime<Utc> {
        self.token_expires_at
    }

    /// Record that the current token expires `seconds` from now
    ///
    /// Offsets beyond the representable range saturate at the far past or
    /// far future.
    pub fn set_token_expires_in(&mut self, seconds: i64) {
        let saturated = if seconds < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        self.token_expires_at = TimeDelta::try_seconds(seconds)
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .unwrap_or(saturated);
    }

    /// Whether the locally tracked expiry has passed
    pub fn token_expired(&self) -> bool {
        self.token_expires_at < Utc::now()
    }

    /// Attach the bearer token, if any
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("token_expires_at", &self.token_expires_at)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Secret Files
// ============================================================================

/// Read a two-line client file: id, then secret
pub fn read_client_file(path: impl AsRef<Path>) -> Result<(String, String)> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mut lines = content.lines().map(str::trim_end);

    let client_id = lines.next().filter(|l| !l.is_empty());
    let client_secret = lines.next().filter(|l| !l.is_empty());
    match (client_id, client_secret) {
        (Some(id), Some(secret)) => Ok((id.to_string(), secret.to_string())),
        _ => Err(Error::config(format!(
            "Client credentials file {} must contain the client id and secret on two lines",
            path.display()
        ))),
    }
}

/// Write a two-line client file
pub fn write_client_file(path: impl AsRef<Path>, client_id: &str, client_secret: &str) -> Result<()> {
    fs::write(path, format!("{client_id}\n{client_secret}\n"))?;
    Ok(())
}

/// Read a single-line token file
pub fn read_token_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .next()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::config(format!("Token file {} is empty", path.display())))
}

/// Write a single-line token file
pub fn write_token_file(path: impl AsRef<Path>, token: &str) -> Result<()> {
    fs::write(path, format!("{token}\n"))?;
    Ok(())
}
