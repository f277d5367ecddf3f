//! Page stepping on the client

use super::types::{Cursor, PageSource};
use crate::api::expect_list;
use crate::client::Mastodon;
use crate::decode::Value;
use crate::error::Result;
use tracing::debug;

impl Mastodon {
    /// Fetch the page after `previous`
    ///
    /// Returns `Ok(None)` when no next cursor is attached.
    pub async fn fetch_next<'a>(
        &mut self,
        previous: impl Into<PageSource<'a>>,
    ) -> Result<Option<Vec<Value>>> {
        let Some(cursor) = previous.into().next_cursor().cloned() else {
            return Ok(None);
        };
        self.replay(&cursor).await.map(Some)
    }

    /// Fetch the page before `next`
    ///
    /// Returns `Ok(None)` when no previous cursor is attached.
    pub async fn fetch_previous<'a>(
        &mut self,
        next: impl Into<PageSource<'a>>,
    ) -> Result<Option<Vec<Value>>> {
        let Some(cursor) = next.into().prev_cursor().cloned() else {
            return Ok(None);
        };
        self.replay(&cursor).await.map(Some)
    }

    /// Fetch every page after `first_page` and return all items in order
    ///
    /// Keeps requesting until a page comes back empty or without a next
    /// cursor. There is no cap on the number of requests.
    pub async fn fetch_remaining(&mut self, first_page: &[Value]) -> Result<Vec<Value>> {
        let mut all = first_page.to_vec();
        let mut current = self.fetch_next(first_page).await?;

        while let Some(page) = current {
            if page.is_empty() {
                break;
            }
            debug!("Fetched page of {} items, {} so far", page.len(), all.len() + page.len());
            current = self.fetch_next(&page).await?;
            all.extend(page);
        }

        Ok(all)
    }

    async fn replay(&mut self, cursor: &Cursor) -> Result<Vec<Value>> {
        let value = self
            .request(cursor.method, &cursor.endpoint, cursor.params.clone())
            .await?;
        expect_list(value, &cursor.endpoint)
    }
}
