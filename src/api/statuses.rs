//! Statuses: reading, posting and interacting

use super::expect_list;
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use crate::params::{Id, IntoId, Params};
use crate::types::{Method, Visibility};
use crate::version::Version;

/// A new status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPost {
    pub status: String,
    pub in_reply_to_id: Option<Id>,
    /// Up to four attachments uploaded with `media_post`
    pub media_ids: Vec<Id>,
    /// Hide attached media behind a warning
    pub sensitive: bool,
    /// Server default when unset
    pub visibility: Option<Visibility>,
    /// Content warning shown before the text
    pub spoiler_text: Option<String>,
}

impl StatusPost {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_reply_to(mut self, id: Id) -> Self {
        self.in_reply_to_id = Some(id);
        self
    }

    #[must_use]
    pub fn media_ids(mut self, ids: Vec<Id>) -> Self {
        self.media_ids = ids;
        self
    }

    #[must_use]
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    pub fn spoiler_text(mut self, text: impl Into<String>) -> Self {
        self.spoiler_text = Some(text.into());
        self
    }

    fn to_params(&self) -> Params {
        let mut params = Params::new()
            .set("status", self.status.as_str())
            .set_opt("in_reply_to_id", self.in_reply_to_id.clone())
            .flag("sensitive", self.sensitive)
            .set_opt("visibility", self.visibility.map(Visibility::as_str))
            .set_opt("spoiler_text", self.spoiler_text.clone());
        if !self.media_ids.is_empty() {
            params.insert("media_ids", self.media_ids.clone());
        }
        params
    }
}

impl Mastodon {
    // ========================================================================
    // Reading
    // ========================================================================

    pub async fn status(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        let id = id.into_id()?;
        self.request(Method::GET, &format!("/api/v1/statuses/{id}"), Params::new())
            .await
    }

    /// Preview card for the first link in a status
    pub async fn status_card(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let id = id.into_id()?;
        self.request(Method::GET, &format!("/api/v1/statuses/{id}/card"), Params::new())
            .await
    }

    /// Ancestors and descendants of a status
    pub async fn status_context(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let id = id.into_id()?;
        self.request(Method::GET, &format!("/api/v1/statuses/{id}/context"), Params::new())
            .await
    }

    pub async fn status_reblogged_by(&mut self, id: impl IntoId) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        let id = id.into_id()?;
        let endpoint = format!("/api/v1/statuses/{id}/reblogged_by");
        let value = self.request(Method::GET, &endpoint, Params::new()).await?;
        expect_list(value, &endpoint)
    }

    pub async fn status_favourited_by(&mut self, id: impl IntoId) -> Result<Vec<Value>> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 1, 0))?;
        let id = id.into_id()?;
        let endpoint = format!("/api/v1/statuses/{id}/favourited_by");
        let value = self.request(Method::GET, &endpoint, Params::new()).await?;
        expect_list(value, &endpoint)
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Post a status
    pub async fn status_post(&mut self, post: &StatusPost) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        self.request(Method::POST, "/api/v1/statuses", post.to_params())
            .await
    }

    /// Post a plain public status
    pub async fn toot(&mut self, status: &str) -> Result<Value> {
        self.status_post(&StatusPost::new(status)).await
    }

    pub async fn status_delete(&mut self, id: impl IntoId) -> Result<()> {
        self.require_version(Version::new(1, 0, 0), Version::new(1, 0, 0))?;
        let id = id.into_id()?;
        self.request(Method::DELETE, &format!("/api/v1/statuses/{id}"), Params::new())
            .await?;
        Ok(())
    }

    pub async fn status_reblog(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        self.status_action(id, "reblog").await
    }

    pub async fn status_unreblog(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        self.status_action(id, "unreblog").await
    }

    pub async fn status_favourite(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        self.status_action(id, "favourite").await
    }

    pub async fn status_unfavourite(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 0, 0), Version::new(2, 0, 0))?;
        self.status_action(id, "unfavourite").await
    }

    /// Stop notifications about a conversation
    pub async fn status_mute(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 4, 0), Version::new(2, 0, 0))?;
        self.status_action(id, "mute").await
    }

    pub async fn status_unmute(&mut self, id: impl IntoId) -> Result<Value> {
        self.require_version(Version::new(1, 4, 0), Version::new(2, 0, 0))?;
        self.status_action(id, "unmute").await
    }

    async fn status_action(&mut self, id: impl IntoId, action: &str) -> Result<Value> {
        let id = id.into_id()?;
        self.request(
            Method::POST,
            &format!("/api/v1/statuses/{id}/{action}"),
            Params::new(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_post_params() {
        let post = StatusPost::new("hello")
            .in_reply_to(Id::new("7"))
            .media_ids(vec![Id::new("1"), Id::new("2")])
            .visibility(Visibility::Unlisted)
            .spoiler_text("cw");
        let params = post.to_params();

        assert_eq!(params.get("status"), Some(&ParamValue::Str("hello".into())));
        assert_eq!(params.get("visibility"), Some(&ParamValue::Str("unlisted".into())));
        assert_eq!(params.get("in_reply_to_id"), Some(&ParamValue::Str("7".into())));
        assert!(!params.contains("sensitive"));
        assert_eq!(
            params
                .to_pairs()
                .iter()
                .filter(|(k, _)| k == "media_ids[]")
                .count(),
            2
        );
    }

    #[test]
    fn test_minimal_post_sends_only_status() {
        let params = StatusPost::new("hi").to_params();
        assert_eq!(params.len(), 1);
    }
}
