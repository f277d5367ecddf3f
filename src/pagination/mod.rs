//! Pagination module
//!
//! # Overview
//!
//! List endpoints advertise neighbouring pages through the `Link` response
//! header. The request engine turns the `next` and `prev` relations into
//! replayable [`Cursor`]s and attaches them to the last and first element
//! of the returned page. The client then steps forward, backward, or drains
//! every remaining page by replaying those cursors.

mod fetch;
mod links;
mod types;

pub(crate) use links::attach_cursors;
pub use links::{parse_link_header, LinkRelation};
pub use types::{Cursor, PageSource};
