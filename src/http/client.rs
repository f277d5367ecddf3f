//! HTTP request engine
//!
//! Executes one logical API call:
//! - attaches the bearer token
//! - places parameters in the query string (reads), the form body (writes)
//!   or a multipart body (uploads)
//! - consults the rate limiter before and after the exchange, retrying
//!   429 responses under the `wait` and `pace` policies
//! - classifies failures into typed errors
//! - decodes the body and attaches pagination cursors

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::Credentials;
use crate::decode::{decode_body, Value};
use crate::error::{Error, Result};
use crate::pagination::attach_cursors;
use crate::params::Params;
use crate::types::{Method, RateLimitMethod};
use chrono::Utc;
use reqwest::header::LINK;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Longest body excerpt quoted in decode errors
const BODY_EXCERPT_LEN: usize = 500;

/// Configuration for the request engine
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Per-request timeout for REST calls
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: RateLimiterConfig,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300),
            rate_limit: RateLimiterConfig::default(),
            user_agent: format!("mastodon-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = crate::config::protocolize(&url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// A file attached to a multipart request
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl FilePart {
    fn to_part(&self) -> Result<Part> {
        Part::bytes(self.data.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime_type)
            .map_err(|e| Error::illegal_argument(format!("Invalid mime type '{}': {e}", self.mime_type)))
    }
}

/// Request engine holding the connection pool, credentials and rate state
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    credentials: Credentials,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    /// Create a new engine
    pub fn with_config(config: HttpClientConfig, credentials: Credentials) -> Result<Self> {
        // No client-wide timeout: it would also cut long-lived streams.
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::transport("Failed to build HTTP client", e))?;

        let rate_limiter = RateLimiter::new(config.rate_limit.clone());

        Ok(Self {
            client,
            config,
            credentials,
            rate_limiter,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut Credentials {
        &mut self.credentials
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn rate_limiter_mut(&mut self) -> &mut RateLimiter {
        &mut self.rate_limiter
    }

    /// Rate-limited GET
    pub async fn get(&mut self, endpoint: &str, params: &Params) -> Result<Value> {
        self.execute(Method::GET, endpoint, params, &[], true).await
    }

    /// Rate-limited POST
    pub async fn post(&mut self, endpoint: &str, params: &Params) -> Result<Value> {
        self.execute(Method::POST, endpoint, params, &[], true).await
    }

    /// Execute one API call and decode its result
    pub async fn execute(
        &mut self,
        method: Method,
        endpoint: &str,
        params: &Params,
        files: &[FilePart],
        apply_rate_limiting: bool,
    ) -> Result<Value> {
        if apply_rate_limiting {
            self.rate_limiter.before_request().await?;
        }

        let url = self.build_url(endpoint);
        debug!(
            "Request to endpoint {} using method {}, parameters {}, {} file(s)",
            endpoint,
            method,
            params,
            files.len()
        );

        let mut retries: u32 = 0;
        loop {
            let req = self.build_request(method, &url, params, files)?;
            let response = req
                .send()
                .await
                .map_err(|e| Error::transport("Could not complete request", e))?;

            let status = response.status();
            let headers = response.headers().clone();
            debug!("Response received with code {}", status.as_u16());

            if apply_rate_limiting {
                self.rate_limiter.update_from_headers(&headers, Utc::now())?;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if !apply_rate_limiting || self.rate_limiter.method() == RateLimitMethod::Throw {
                    return Err(Error::rate_limit("Hit rate limit."));
                }
                if let Some(max) = self.rate_limiter.config().max_retries {
                    if retries >= max {
                        return Err(Error::rate_limit(format!(
                            "Hit rate limit, gave up after {retries} retries"
                        )));
                    }
                }
                if self.rate_limiter.wait_for_reset().await.is_none() {
                    return Err(Error::rate_limit(
                        "Hit rate limit, and the reported reset time has already passed",
                    ));
                }
                retries += 1;
                warn!("Retrying {} {} after rate limit (retry {})", method, endpoint, retries);
                continue;
            }

            let body = response
                .text()
                .await
                .map_err(|e| Error::transport("Could not read response body", e))?;
            let reason = status.canonical_reason().unwrap_or("").to_string();

            if !status.is_success() {
                return Err(classify_failure(status, reason, &body));
            }

            let mut value = decode_body(&body).map_err(|e| {
                Error::api(
                    status.as_u16(),
                    reason,
                    format!(
                        "Could not parse response as JSON, response code was {}, bad json content was '{}' ({e})",
                        status.as_u16(),
                        excerpt(&body)
                    ),
                )
            })?;

            if let Value::List(items) = &mut value {
                let link = headers.get(LINK).and_then(|v| v.to_str().ok());
                if let Some(link) = link.filter(|l| !l.is_empty()) {
                    attach_cursors(items, link, method, endpoint, params);
                }
            }

            return Ok(value);
        }
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        params: &Params,
        files: &[FilePart],
    ) -> Result<RequestBuilder> {
        let mut req = self
            .client
            .request(method.into(), url)
            .timeout(self.config.timeout);
        req = self.credentials.apply(req);

        let pairs = params.to_pairs();
        if method.uses_query() {
            if !pairs.is_empty() {
                req = req.query(&pairs);
            }
        } else if !files.is_empty() {
            let mut form = Form::new();
            for (key, value) in pairs {
                form = form.text(key, value);
            }
            for file in files {
                form = form.part(file.field.clone(), file.to_part()?);
            }
            req = req.multipart(form);
        } else if !pairs.is_empty() {
            req = req.form(&pairs);
        }

        Ok(req)
    }

    /// Build full URL from an endpoint path
    pub fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("rate_state", self.rate_limiter.state())
            .finish_non_exhaustive()
    }
}

/// Turn a non-success response into the matching typed error
fn classify_failure(status: StatusCode, reason: String, body: &str) -> Error {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from));

    let message = match (message, status) {
        (Some(message), _) => message,
        (None, StatusCode::NOT_FOUND) => "Endpoint not found.".to_string(),
        (None, _) => "no error message".to_string(),
    };
    Error::from_status(status.as_u16(), reason, message)
}

fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LEN {
        return body.to_string();
    }
    let mut end = BODY_EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
