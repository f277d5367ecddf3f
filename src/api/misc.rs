//! Search, moderation and everything else that fits nowhere in particular

use super::{expect_list, PageParams};
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use crate::params::{ids, IntoId, Params};
use crate::types::Method;
use crate::version::Version;

impl Mastodon {
    // ========================================================================
    // Search
    // ========================================================================

    /// Hashtags, accounts and statuses matching `q`
    ///
    /// With `resolve`, remote instances are searched too.
    pub async fn search(&mut self, q: &str, resolve: bool) -> Result<Value> {
        self.require_version(Version::new(1, 1, 0), Version::new(2, 1, 0))?;
        let params = Params::new().set("q", q).set("resolve", resolve);
        self.request(Method::GET, "/api/v1/search", params).await
    }

    // ========================================================================
    // Paged collections
    // ========================================================================

    /// Accounts the logged-in user has muted
    pub async fn mutes(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 1, 0), Version::new(2, 1, 0))?;
        self.paged("/api/v1/mutes", page).await
    }

    pub async fn blocks(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        self.paged("/api/v1/blocks", page).await
    }

    pub async fn favourites(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        self.paged("/api/v1/favourites", page).await
    }

    /// Pending follow requests for a locked account
    pub async fn follow_requests(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        self.paged("/api/v1/follow_requests", page).await
    }

    /// Domains the logged-in user has blocked
    pub async fn domain_blocks(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 4, 0), Version::new(1, 4, 0))?;
        self.paged("/api/v1/domain_blocks", page).await
    }

    async fn paged(&mut self, endpoint: &str, page: &PageParams) -> Result<Vec<Value>> {
        let value = self.request(Method::GET, endpoint, page.to_params()).await?;
        expect_list(value, endpoint)
    }

    // ========================================================================
    // Plain reads
    // ========================================================================

    /// Reports filed by the logged-in user
    pub async fn reports(&mut self) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 1, 0), Version::new(1, 1, 0))?;
        let endpoint = "/api/v1/reports";
        let value = self.request(Method::GET, endpoint, Params::new()).await?;
        expect_list(value, endpoint)
    }

    pub async fn custom_emojis(&mut self) -> Result<Vec<Value>> {
        self.require_version(Version::new(2, 1, 0), Version::new(2, 1, 0))?;
        let endpoint = "/api/v1/custom_emojis";
        let value = self.request(Method::GET, endpoint, Params::new()).await?;
        expect_list(value, endpoint)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Report an account and some of its statuses to the moderators
    pub async fn report<I, T>(&mut self, account_id: impl IntoId, status_ids: I, comment: &str) -> Result<Value>
    where
        I: IntoIterator<Item = T>,
        T: IntoId,
    {
        self.require_version(Version::new(1, 1, 0), Version::new(1, 1, 0))?;
        let params = Params::new()
            .set("account_id", account_id.into_id()?)
            .set("status_ids", ids(status_ids)?)
            .set("comment", comment);
        self.request(Method::POST, "/api/v1/reports/", params).await
    }

    pub async fn follow_request_authorize(&mut self, id: impl IntoId) -> Result<()> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let id = id.into_id()?;
        self.request(
            Method::POST,
            &format!("/api/v1/follow_requests/{id}/authorize"),
            Params::new(),
        )
        .await?;
        Ok(())
    }

    pub async fn follow_request_reject(&mut self, id: impl IntoId) -> Result<()> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let id = id.into_id()?;
        self.request(
            Method::POST,
            &format!("/api/v1/follow_requests/{id}/reject"),
            Params::new(),
        )
        .await?;
        Ok(())
    }

    /// Hide everything from `domain` for the logged-in user
    pub async fn domain_block(&mut self, domain: &str) -> Result<()> {
        self.require_version(Version::new(1, 4, 0), Version::new(1, 4, 0))?;
        self.request(
            Method::POST,
            "/api/v1/domain_blocks",
            Params::new().set("domain", domain),
        )
        .await?;
        Ok(())
    }

    pub async fn domain_unblock(&mut self, domain: &str) -> Result<()> {
        self.require_version(Version::new(1, 4, 0), Version::new(1, 4, 0))?;
        self.request(
            Method::DELETE,
            "/api/v1/domain_blocks",
            Params::new().set("domain", domain),
        )
        .await?;
        Ok(())
    }
}
