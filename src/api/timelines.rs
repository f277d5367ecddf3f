//! Timelines

use super::{check_tag, expect_list, PageParams};
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use crate::params::IntoId;
use crate::types::Method;
use crate::version::Version;

impl Mastodon {
    /// Fetch statuses from a named timeline, newest first
    ///
    /// `timeline` is `home`, `local`, `public`, `tag/<hashtag>` or
    /// `list/<id>`. `local` is the public timeline restricted to this
    /// instance.
    pub async fn timeline(&mut self, timeline: &str, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;

        let mut params = page.to_params();
        let name = if timeline == "local" {
            params.insert("local", true);
            "public"
        } else {
            timeline
        };

        let endpoint = format!("/api/v1/timelines/{name}");
        let value = self.request(Method::GET, &endpoint, params).await?;
        expect_list(value, &endpoint)
    }

    /// The logged-in user's home timeline
    pub async fn timeline_home(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.timeline("home", page).await
    }

    /// The instance-local public timeline
    pub async fn timeline_local(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.timeline("local", page).await
    }

    /// The federated public timeline
    pub async fn timeline_public(&mut self, page: &PageParams) -> Result<Vec<Value>> {
        self.timeline("public", page).await
    }

    /// Statuses carrying `hashtag`, given without its leading `#`
    pub async fn timeline_hashtag(
        &mut self,
        hashtag: &str,
        local: bool,
        page: &PageParams,
    ) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        check_tag(hashtag, "Hashtag")?;

        let params = page.to_params().flag("local", local);
        let endpoint = format!("/api/v1/timelines/tag/{hashtag}");
        let value = self.request(Method::GET, &endpoint, params).await?;
        expect_list(value, &endpoint)
    }

    /// Statuses by the members of a list
    pub async fn timeline_list(&mut self, id: impl IntoId, page: &PageParams) -> Result<Vec<Value>> {
        self.require_version(Version::new(2, 1, 0), Version::new(2, 1, 0))?;
        let id = id.into_id()?;
        self.timeline(&format!("list/{id}"), page).await
    }
}
