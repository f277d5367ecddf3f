//! Client configuration
//!
//! `ClientConfig` is loaded from YAML or assembled with
//! [`ClientConfig::builder`]. It carries the instance URL, credentials (or
//! the files holding them), the rate limit policy and the version gate
//! settings.

use crate::auth::{read_client_file, read_token_file, Credentials};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{OptionStringExt, RateLimitMethod, VersionCheckMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Instance used when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://mastodon.social";

/// Add `https://` to a scheme-less URL and drop trailing slashes
pub fn protocolize(base_url: &str) -> String {
    let trimmed = base_url.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

// ============================================================================
// Client Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Instance base URL
    #[serde(default = "default_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    /// Two-line file holding the client id and secret
    #[serde(default)]
    pub client_credentials_file: Option<PathBuf>,

    #[serde(default)]
    pub access_token: Option<String>,

    /// Single-line file holding the access token
    #[serde(default)]
    pub access_token_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout: u64,

    #[serde(default)]
    pub ratelimit_method: RateLimitMethod,

    #[serde(default = "default_pace_factor")]
    pub ratelimit_pacefactor: f64,

    /// Longest single rate limit sleep in seconds
    #[serde(default = "default_max_wait")]
    pub ratelimit_max_wait: u64,

    /// Bound on consecutive 429 retries; unbounded when unset
    #[serde(default)]
    pub ratelimit_max_retries: Option<u32>,

    /// Server version to assume instead of asking the instance
    #[serde(default)]
    pub mastodon_version: Option<String>,

    #[serde(default)]
    pub version_check_mode: VersionCheckMode,

    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_pace_factor() -> f64 {
    1.1
}

fn default_max_wait() -> u64 {
    300
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            client_id: None,
            client_secret: None,
            client_credentials_file: None,
            access_token: None,
            access_token_file: None,
            request_timeout: default_timeout(),
            ratelimit_method: RateLimitMethod::default(),
            ratelimit_pacefactor: default_pace_factor(),
            ratelimit_max_wait: default_max_wait(),
            ratelimit_max_retries: None,
            mastodon_version: None,
            version_check_mode: VersionCheckMode::default(),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Engine settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let mut rate_limit = RateLimiterConfig::new(self.ratelimit_method)
            .pace_factor(self.ratelimit_pacefactor)
            .max_wait(Duration::from_secs(self.ratelimit_max_wait));
        if let Some(retries) = self.ratelimit_max_retries {
            rate_limit = rate_limit.max_retries(retries);
        }

        let mut builder = HttpClientConfig::builder()
            .base_url(&self.api_base_url)
            .timeout(self.timeout())
            .rate_limit(rate_limit);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Resolve credentials, reading any configured secret files
    ///
    /// A client id without a secret or credentials file is rejected.
    pub fn load_credentials(&self) -> Result<Credentials> {
        let mut credentials = Credentials::new();

        if let Some(path) = &self.client_credentials_file {
            let (id, secret) = read_client_file(path)?;
            credentials = credentials.client(id, secret);
        } else if let Some(id) = self.client_id.clone().none_if_empty() {
            let secret = self.client_secret.clone().none_if_empty().ok_or_else(|| {
                Error::illegal_argument("Specified client id directly, but did not supply secret")
            })?;
            credentials = credentials.client(id, secret);
        }

        // Empty values in YAML count as unset.
        let token = match (self.access_token.clone().none_if_empty(), &self.access_token_file) {
            (Some(token), _) => Some(token),
            (None, Some(path)) => Some(read_token_file(path)?),
            (None, None) => None,
        };
        credentials.set_access_token(token);

        Ok(credentials)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn client(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.config.client_id = Some(client_id.into());
        self.config.client_secret = Some(client_secret.into());
        self
    }

    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn client_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.client_credentials_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn access_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.access_token_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn ratelimit_method(mut self, method: RateLimitMethod) -> Self {
        self.config.ratelimit_method = method;
        self
    }

    #[must_use]
    pub fn ratelimit_pacefactor(mut self, factor: f64) -> Self {
        self.config.ratelimit_pacefactor = factor;
        self
    }

    #[must_use]
    pub fn ratelimit_max_wait(mut self, max_wait: Duration) -> Self {
        self.config.ratelimit_max_wait = max_wait.as_secs();
        self
    }

    #[must_use]
    pub fn ratelimit_max_retries(mut self, retries: u32) -> Self {
        self.config.ratelimit_max_retries = Some(retries);
        self
    }

    #[must_use]
    pub fn mastodon_version(mut self, version: impl Into<String>) -> Self {
        self.config.mastodon_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn version_check_mode(mut self, mode: VersionCheckMode) -> Self {
        self.config.version_check_mode = mode;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("mastodon.example", "https://mastodon.example" ; "bare host")]
    #[test_case("https://mastodon.example/", "https://mastodon.example" ; "trailing slash")]
    #[test_case("http://localhost:3000", "http://localhost:3000" ; "plain http kept")]
    #[test_case("  https://a.example//  ", "https://a.example" ; "whitespace and slashes")]
    fn test_protocolize(input: &str, expected: &str) {
        assert_eq!(protocolize(input), expected);
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let yaml = r#"
api_base_url: "mastodon.example"
access_token: "abc"
ratelimit_method: pace
version_check_mode: strict-behavior
"#;
        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.api_base_url, "mastodon.example");
        assert_eq!(config.ratelimit_method, RateLimitMethod::Pace);
        assert_eq!(config.version_check_mode, VersionCheckMode::Changed);
        assert_eq!(config.request_timeout, 300);
        assert_eq!(config.ratelimit_max_wait, 300);
        assert!(config.ratelimit_max_retries.is_none());

        let http = config.http_config();
        assert_eq!(http.base_url, "https://mastodon.example");
        assert_eq!(http.rate_limit.method, RateLimitMethod::Pace);
        assert_eq!(http.rate_limit.pace_factor, 1.1);
    }

    #[test]
    fn test_bad_yaml() {
        let err = ClientConfig::from_yaml("ratelimit_method: [nope").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_unknown_ratelimit_method_rejected() {
        assert!(ClientConfig::from_yaml("ratelimit_method: sometimes").is_err());
    }

    #[test]
    fn test_client_id_without_secret_rejected() {
        let config = ClientConfig::builder().client_id("abc").build();
        let err = config.load_credentials().unwrap_err();
        assert!(matches!(err, Error::IllegalArgument { .. }));
    }

    #[test]
    fn test_credentials_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let client_file = dir.path().join("clientcred.secret");
        let token_file = dir.path().join("usercred.secret");
        std::fs::write(&client_file, "my-id\nmy-secret\n").unwrap();
        std::fs::write(&token_file, "my-token\n").unwrap();

        let config = ClientConfig::builder()
            .client_credentials_file(&client_file)
            .access_token_file(&token_file)
            .build();
        let credentials = config.load_credentials().unwrap();
        assert_eq!(credentials.client_id.as_deref(), Some("my-id"));
        assert_eq!(credentials.client_secret.as_deref(), Some("my-secret"));
        assert_eq!(credentials.access_token(), Some("my-token"));
    }

    #[test]
    fn test_max_retries_carried_to_engine() {
        let config = ClientConfig::builder()
            .ratelimit_max_retries(2)
            .ratelimit_max_wait(Duration::from_secs(5))
            .build();
        let http = config.http_config();
        assert_eq!(http.rate_limit.max_retries, Some(2));
        assert_eq!(http.rate_limit.max_wait, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_token_counts_as_unset() {
        let config = ClientConfig::from_yaml("access_token: \"\"\nclient_id: \"\"").unwrap();
        let credentials = config.load_credentials().unwrap();
        assert_eq!(credentials.access_token(), None);
        assert_eq!(credentials.client_id, None);
    }
}
