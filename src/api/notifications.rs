//! Notifications

use super::{expect_list, PageParams};
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use crate::params::{IntoId, Params};
use crate::types::Method;
use crate::version::Version;

impl Mastodon {
    /// Mentions, favourites, reblogs and follows for the logged-in user
    pub async fn notifications(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let endpoint = "/api/v1/notifications";
        let value = self.request(Method::GET, endpoint, page.to_params()).await?;
        expect_list(value, endpoint)
    }

    /// A single notification
    pub async fn notification(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let id = id.into_id()?;
        self.request(Method::GET, &format!("/api/v1/notifications/{id}"), Params::new())
            .await
    }

    /// Remove every notification
    pub async fn notifications_clear(&mut self) -> Result<()> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        self.request(Method::POST, "/api/v1/notifications/clear", Params::new())
            .await?;
        Ok(())
    }

    /// Remove a single notification
    pub async fn notifications_dismiss(&mut self, id: impl IntoId) -> Result<()> {
        self.require_version(Version::new(1, 3, 0), Version::new(1, 3, 0))?;
        let params = Params::new().set("id", id.into_id()?);
        self.request(Method::POST, "/api/v1/notifications/dismiss", params)
            .await?;
        Ok(())
    }
}
