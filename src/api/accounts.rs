//! Accounts and relationships

use super::{expect_list, PageParams};
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use crate::params::{ids, IntoId, Params};
use crate::types::Method;
use crate::version::Version;

/// Filters for [`Mastodon::account_statuses`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountStatusFilter {
    /// Only statuses with media attachments
    pub only_media: bool,
    /// Only pinned statuses; reliable for local accounts only
    pub pinned: bool,
    pub exclude_replies: bool,
}

impl AccountStatusFilter {
    fn apply(self, params: Params) -> Params {
        params
            .flag("only_media", self.only_media)
            .flag("pinned", self.pinned)
            .flag("exclude_replies", self.exclude_replies)
    }
}

/// Profile fields for [`Mastodon::account_update_credentials`]
///
/// `avatar` and `header` are data URIs, see [`data_uri`](super::data_uri).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    /// The bio
    pub note: Option<String>,
    pub avatar: Option<String>,
    pub header: Option<String>,
}

impl Mastodon {
    // ========================================================================
    // Reading
    // ========================================================================

    pub async fn account(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let id = id.into_id()?;
        self.request(Method::GET, &format!("/api/v1/accounts/{id}"), Params::new())
            .await
    }

    /// The logged-in user's own account
    pub async fn account_verify_credentials(&mut self) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        self.request(
            Method::GET,
            "/api/v1/accounts/verify_credentials",
            Params::new(),
        )
        .await
    }

    /// Statuses by an account, as visible to the logged-in user
    pub async fn account_statuses(
        &mut self,
        id: impl IntoId,
        filter: AccountStatusFilter,
        page: &PageParams,
    ) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        let id = id.into_id()?;
        let endpoint = format!("/api/v1/accounts/{id}/statuses");
        let params = filter.apply(page.to_params());
        let value = self.request(Method::GET, &endpoint, params).await?;
        expect_list(value, &endpoint)
    }

    pub async fn account_following(&mut self, id: impl IntoId, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        self.account_collection(id, "following", page).await
    }

    pub async fn account_followers(&mut self, id: impl IntoId, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        self.account_collection(id, "followers", page).await
    }

    /// Relationship of the logged-in user to each given account
    pub async fn account_relationships<I, T>(&mut self, account_ids: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = T>,
        T: IntoId,
    {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 4, 0))?;
        let endpoint = "/api/v1/accounts/relationships";
        let params = Params::new().set("id", ids(account_ids)?);
        let value = self.request(Method::GET, endpoint, params).await?;
        expect_list(value, endpoint)
    }

    /// Find accounts; `user@domain` queries resolve remote accounts
    pub async fn account_search(&mut self, q: &str, limit: Option<u32>) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        let endpoint = "/api/v1/accounts/search";
        let params = Params::new().set("q", q).set_opt("limit", limit);
        let value = self.request(Method::GET, endpoint, params).await?;
        expect_list(value, endpoint)
    }

    /// The logged-in user's lists that contain an account
    pub async fn account_lists(&mut self, id: impl IntoId) -> Result<Vec<Value>> {
        self.require_version(Version::new(2, 1, 0), Version::new(2, 1, 0))?;
        let id = id.into_id()?;
        let endpoint = format!("/api/v1/accounts/{id}/lists");
        let value = self.request(Method::GET, &endpoint, Params::new()).await?;
        expect_list(value, &endpoint)
    }

    async fn account_collection(
        &mut self,
        id: impl IntoId,
        collection: &str,
        page: &PageParams,
    ) -> Result<Vec<Value>> {
        let id = id.into_id()?;
        let endpoint = format!("/api/v1/accounts/{id}/{collection}");
        let value = self.request(Method::GET, &endpoint, page.to_params()).await?;
        expect_list(value, &endpoint)
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Follow an account; returns the new relationship
    pub async fn account_follow(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 4, 0))?;
        self.account_action(id, "follow").await
    }

    pub async fn account_unfollow(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 4, 0))?;
        self.account_action(id, "unfollow").await
    }

    pub async fn account_block(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 4, 0))?;
        self.account_action(id, "block").await
    }

    pub async fn account_unblock(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 4, 0))?;
        self.account_action(id, "unblock").await
    }

    pub async fn account_mute(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 1, 0), Version::new(1, 4, 0))?;
        self.account_action(id, "mute").await
    }

    pub async fn account_unmute(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 1, 0), Version::new(1, 4, 0))?;
        self.account_action(id, "unmute").await
    }

    /// Update the logged-in user's profile
    pub async fn account_update_credentials(&mut self, update: &ProfileUpdate) -> Result<Value> {
        self.require_version(Version::new(1, 1, 1), Version::new(2, 1, 0))?;
        let params = Params::new()
            .set_opt("display_name", update.display_name.clone())
            .set_opt("note", update.note.clone())
            .set_opt("avatar", update.avatar.clone())
            .set_opt("header", update.header.clone());
        self.request(
            Method::PATCH,
            "/api/v1/accounts/update_credentials",
            params,
        )
        .await
    }

    /// Follow a remote account by `username@domain`
    pub async fn follows(&mut self, uri: &str) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        self.request(Method::POST, "/api/v1/follows", Params::new().set("uri", uri))
            .await
    }

    async fn account_action(&mut self, id: impl IntoId, action: &str) -> Result<Value> {
        let id = id.into_id()?;
        self.request(
            Method::POST,
            &format!("/api/v1/accounts/{id}/{action}"),
            Params::new(),
        )
        .await
    }
}
