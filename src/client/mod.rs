//! The API client
//!
//! [`Mastodon`] ties the request engine, credentials and version gate
//! together. Resource operations live in [`crate::api`], pagination in
//! [`crate::pagination`] and streaming in [`crate::streaming`]; all of them
//! are methods on this type.

use crate::config::ClientConfig;
use crate::decode::Value;
use crate::error::{Error, Result};
use crate::http::{FilePart, HttpClient};
use crate::params::Params;
use crate::types::{Method, VersionCheckMode};
use crate::version::{check_version, Version};
use tracing::{debug, info, warn};

/// Newest server version whose API this client knows
pub const SUPPORTED_VERSION: &str = "2.2.0";

/// Version assumed when the instance does not report one
const FALLBACK_VERSION: &str = "1.0.0";

/// Client for one Mastodon instance
///
/// Every call takes `&mut self`: the rate limiter state lives here, so
/// sharing one client across tasks needs external synchronization.
pub struct Mastodon {
    pub(crate) http: HttpClient,
    version: Version,
    version_check_mode: VersionCheckMode,
}

impl Mastodon {
    /// Build a client from config
    ///
    /// Loads credential files, then seeds the version gate either from
    /// `mastodon_version` or by asking the instance.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let credentials = config.load_credentials()?;
        let http = HttpClient::with_config(config.http_config(), credentials)?;

        let mut client = Self {
            http,
            version: Version::default(),
            version_check_mode: config.version_check_mode,
        };

        match &config.mastodon_version {
            Some(version) => {
                client.version =
                    Version::parse(version).map_err(|_| Error::version("Bad version specified"))?;
            }
            None => {
                client.retrieve_mastodon_version().await?;
            }
        }

        info!(
            "Connected client for {} (version {})",
            client.api_base_url(),
            client.version
        );
        Ok(client)
    }

    pub fn api_base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Version the gate currently compares against
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn version_check_mode(&self) -> VersionCheckMode {
        self.version_check_mode
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut HttpClient {
        &mut self.http
    }

    /// Newest server version this client supports
    pub fn supported_version() -> &'static str {
        SUPPORTED_VERSION
    }

    /// Ask the instance for its version and reseed the gate
    ///
    /// Returns the raw version string. Servers that cannot answer are
    /// assumed to run 1.0.0, which predates the instance endpoint.
    pub async fn retrieve_mastodon_version(&mut self) -> Result<String> {
        let raw = match self.fetch_instance().await {
            Ok(instance) => instance["version"]
                .as_str()
                .map_or_else(|| FALLBACK_VERSION.to_string(), String::from),
            Err(e) => {
                warn!("Could not retrieve instance version, assuming {}: {}", FALLBACK_VERSION, e);
                FALLBACK_VERSION.to_string()
            }
        };

        self.version = Version::parse(&raw)?;
        debug!("Instance reports version {} ({})", raw, self.version);
        Ok(raw)
    }

    /// Refresh the server version and check it is at least `version`
    pub async fn verify_minimum_version(&mut self, version: &str) -> Result<bool> {
        self.retrieve_mastodon_version().await?;
        let required = Version::parse(version)?;
        Ok(required <= self.version)
    }

    /// Version guard run at the top of each resource operation
    pub(crate) fn require_version(&self, introduced: Version, changed: Version) -> Result<()> {
        check_version(self.version_check_mode, self.version, introduced, changed)
    }

    /// Rate-limited call without files
    pub(crate) async fn request(
        &mut self,
        method: Method,
        endpoint: &str,
        params: Params,
    ) -> Result<Value> {
        self.http.execute(method, endpoint, &params, &[], true).await
    }

    /// Rate-limited multipart call
    pub(crate) async fn request_with_files(
        &mut self,
        method: Method,
        endpoint: &str,
        params: Params,
        files: Vec<FilePart>,
    ) -> Result<Value> {
        self.http.execute(method, endpoint, &params, &files, true).await
    }

    /// Instance info, used for version negotiation
    async fn fetch_instance(&mut self) -> Result<Value> {
        self.http
            .execute(Method::GET, "/api/v1/instance/", &Params::new(), &[], true)
            .await
    }
}

impl std::fmt::Debug for Mastodon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mastodon")
            .field("api_base_url", &self.api_base_url())
            .field("version", &self.version)
            .field("version_check_mode", &self.version_check_mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
