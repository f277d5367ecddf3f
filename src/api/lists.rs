//! User lists

use super::{expect_list, PageParams};
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use crate::params::{ids, IntoId, Params};
use crate::types::Method;
use crate::version::Version;

const LISTS: Version = Version::new(2, 1, 0);

impl Mastodon {
    /// Lists owned by the logged-in user
    pub async fn lists(&mut self) -> Result<Vec<Value>> {
        self.require_version(LISTS, LISTS)?;
        let endpoint = "/api/v1/lists";
        let value = self.request(Method::GET, endpoint, Params::new()).await?;
        expect_list(value, endpoint)
    }

    pub async fn list(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(LISTS, LISTS)?;
        let id = id.into_id()?;
        self.request(Method::GET, &format!("/api/v1/lists/{id}"), Params::new())
            .await
    }

    /// Accounts on a list; a limit of 0 returns all of them unpaginated
    pub async fn list_accounts(&mut self, id: impl IntoId, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(LISTS, LISTS)?;
        let id = id.into_id()?;
        let endpoint = format!("/api/v1/lists/{id}/accounts");
        let value = self.request(Method::GET, &endpoint, page.to_params()).await?;
        expect_list(value, &endpoint)
    }

    pub async fn list_create(&mut self, title: &str) -> Result<Value> {
        self.require_version(LISTS, LISTS)?;
        self.request(Method::POST, "/api/v1/lists", Params::new().set("title", title))
            .await
    }

    /// Rename a list
    pub async fn list_update(&mut self, id: impl IntoId, title: &str) -> Result<Value> {
        self.require_version(LISTS, LISTS)?;
        let id = id.into_id()?;
        self.request(
            Method::PUT,
            &format!("/api/v1/lists/{id}"),
            Params::new().set("title", title),
        )
        .await
    }

    pub async fn list_delete(&mut self, id: impl IntoId) -> Result<()> {
        self.require_version(LISTS, LISTS)?;
        let id = id.into_id()?;
        self.request(Method::DELETE, &format!("/api/v1/lists/{id}"), Params::new())
            .await?;
        Ok(())
    }

    pub async fn list_accounts_add<I, T>(&mut self, id: impl IntoId, account_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: IntoId,
    {
        self.require_version(LISTS, LISTS)?;
        let id = id.into_id()?;
        let params = Params::new().set("account_ids", ids(account_ids)?);
        self.request(Method::POST, &format!("/api/v1/lists/{id}/accounts"), params)
            .await?;
        Ok(())
    }

    pub async fn list_accounts_delete<I, T>(&mut self, id: impl IntoId, account_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: IntoId,
    {
        self.require_version(LISTS, LISTS)?;
        let id = id.into_id()?;
        let params = Params::new().set("account_ids", ids(account_ids)?);
        self.request(Method::DELETE, &format!("/api/v1/lists/{id}/accounts"), params)
            .await?;
        Ok(())
    }
}
