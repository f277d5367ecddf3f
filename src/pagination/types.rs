//! Pagination types
//!
//! Defines the replayable cursor and the inputs the fetch operations accept.

use crate::decode::{Record, Value};
use crate::params::Params;
use crate::types::Method;
use serde::{Deserialize, Serialize};

/// Everything needed to replay a paginated request
///
/// Cursors are plain data: they can be cloned, compared and serialized by
/// the caller to resume pagination later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub method: Method,
    /// Endpoint path, e.g. `/api/v1/timelines/home`
    pub endpoint: String,
    /// Parameters of the original call with the cursor id substituted
    pub params: Params,
}

impl Cursor {
    pub fn new(method: Method, endpoint: impl Into<String>, params: Params) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params,
        }
    }
}

/// Where to look for the cursor of a neighbouring page
#[derive(Debug, Clone, Copy)]
pub enum PageSource<'a> {
    /// A previously fetched page
    Page(&'a [Value]),
    /// A single record carrying cursor metadata
    Record(&'a Record),
    /// A bare cursor
    Cursor(&'a Cursor),
}

impl<'a> PageSource<'a> {
    /// Cursor for the page after this one
    pub fn next_cursor(self) -> Option<&'a Cursor> {
        match self {
            PageSource::Page(items) => items.last().and_then(Value::as_record)?.pagination_next(),
            PageSource::Record(record) => record.pagination_next(),
            PageSource::Cursor(cursor) => Some(cursor),
        }
    }

    /// Cursor for the page before this one
    pub fn prev_cursor(self) -> Option<&'a Cursor> {
        match self {
            PageSource::Page(items) => items.first().and_then(Value::as_record)?.pagination_prev(),
            PageSource::Record(record) => record.pagination_prev(),
            PageSource::Cursor(cursor) => Some(cursor),
        }
    }
}

impl<'a> From<&'a [Value]> for PageSource<'a> {
    fn from(items: &'a [Value]) -> Self {
        PageSource::Page(items)
    }
}

impl<'a> From<&'a Vec<Value>> for PageSource<'a> {
    fn from(items: &'a Vec<Value>) -> Self {
        PageSource::Page(items)
    }
}

impl<'a> From<&'a Record> for PageSource<'a> {
    fn from(record: &'a Record) -> Self {
        PageSource::Record(record)
    }
}

impl<'a> From<&'a Cursor> for PageSource<'a> {
    fn from(cursor: &'a Cursor) -> Self {
        PageSource::Cursor(cursor)
    }
}

impl<'a> From<&'a Value> for PageSource<'a> {
    /// Lists are pages, records carry their own cursors; anything else has none
    fn from(value: &'a Value) -> Self {
        match value {
            Value::List(items) => PageSource::Page(items),
            Value::Record(record) => PageSource::Record(record),
            _ => PageSource::Page(&[]),
        }
    }
}
