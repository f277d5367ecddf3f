//! Resource catalogue
//!
//! Thin wrappers over the request engine, one per REST endpoint. Each
//! operation runs the version guard with the version it was introduced in
//! and the version its behavior last changed in, normalizes its arguments
//! into [`Params`], and hands off to the engine.
//!
//! Single entities come back as [`Value`]s, lists as `Vec<Value>` so they can
//! be fed straight into [`Mastodon::fetch_next`](crate::Mastodon::fetch_next).

mod accounts;
mod instance;
mod lists;
mod media;
mod misc;
mod notifications;
mod statuses;
mod timelines;

pub use accounts::{AccountStatusFilter, ProfileUpdate};
pub use media::{data_uri, guess_mime_type, MediaSource};
pub use statuses::StatusPost;

use crate::decode::Value;
use crate::error::{Error, Result};
use crate::params::{Id, Params};

/// Paging window shared by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    /// Return results older than this id
    pub max_id: Option<Id>,
    /// Return results newer than this id
    pub since_id: Option<Id>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_id(mut self, id: Id) -> Self {
        self.max_id = Some(id);
        self
    }

    #[must_use]
    pub fn since_id(mut self, id: Id) -> Self {
        self.since_id = Some(id);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Merge into request parameters, dropping unset fields
    pub(crate) fn apply(&self, params: Params) -> Params {
        params
            .set_opt("max_id", self.max_id.clone())
            .set_opt("since_id", self.since_id.clone())
            .set_opt("limit", self.limit)
    }

    pub(crate) fn to_params(&self) -> Params {
        self.apply(Params::new())
    }
}

/// Unwrap a list payload
pub(crate) fn expect_list(value: Value, endpoint: &str) -> Result<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(Error::Other(format!(
            "Expected a list from {endpoint}, got {}",
            other.kind()
        ))),
    }
}

/// Reject tags given with their leading `#`
pub(crate) fn check_tag(tag: &str, what: &str) -> Result<()> {
    if tag.starts_with('#') {
        return Err(Error::illegal_argument(format!(
            "{what} parameter should omit leading #"
        )));
    }
    Ok(())
}
