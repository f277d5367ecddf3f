//! Instance information

use super::expect_list;
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use crate::params::Params;
use crate::types::Method;
use crate::version::Version;

impl Mastodon {
    /// Basic information about the instance, including the URLs of its
    /// streaming server
    pub async fn instance(&mut self) -> Result<Value> {
        self.require_version(Version::new(1, 1, 0), Version::new(1, 4, 2))?;
        self.request(Method::GET, "/api/v1/instance/", Params::new())
            .await
    }

    /// Weekly activity counters for the last three months
    pub async fn instance_activity(&mut self) -> Result<Vec<Value>> {
        self.require_version(Version::new(2, 1, 2), Version::new(2, 1, 2))?;
        let endpoint = "/api/v1/instance/activity";
        let value = self.request(Method::GET, endpoint, Params::new()).await?;
        expect_list(value, endpoint)
    }

    /// Domains of the instances this one federates with
    pub async fn instance_peers(&mut self) -> Result<Vec<Value>> {
        self.require_version(Version::new(2, 1, 2), Version::new(2, 1, 2))?;
        let endpoint = "/api/v1/instance/peers";
        let value = self.request(Method::GET, endpoint, Params::new()).await?;
        expect_list(value, endpoint)
    }
}
