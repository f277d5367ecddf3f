//! Link header handling
//!
//! Parses `Link: <url>; rel="next", <url>; rel="prev"` and builds the
//! cursors attached to a decoded page.

use super::types::Cursor;
use crate::decode::Value;
use crate::params::Params;
use crate::types::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MAX_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"max_id=([0-9]+)").expect("valid regex"));
static SINCE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"since_id=([0-9]+)").expect("valid regex"));

/// One entry of a Link header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub url: String,
    pub rel: String,
}

/// Parse a Link header into its relations
///
/// Entries without both a `<url>` and a `rel=` are skipped.
pub fn parse_link_header(header: &str) -> Vec<LinkRelation> {
    let mut relations = Vec::new();

    for part in split_entries(header) {
        let part = part.trim();
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                rel = Some(stripped.trim_matches('"').trim_matches('\''));
            }
        }

        if let (Some(url), Some(rel)) = (url, rel) {
            relations.push(LinkRelation {
                url: url.to_string(),
                rel: rel.to_string(),
            });
        }
    }

    relations
}

/// Split a header into entries, only at commas that open a new `<url>`
fn split_entries(header: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for piece in header.split(',') {
        match entries.last_mut() {
            Some(last) if !piece.trim_start().starts_with('<') => {
                last.push(',');
                last.push_str(piece);
            }
            _ => entries.push(piece.to_string()),
        }
    }
    entries
}

/// Attach `next`/`prev` cursors from a Link header to the edges of a page
///
/// The next cursor goes on the last element, the previous cursor on the
/// first. Relations whose URL carries no cursor id are ignored.
pub(crate) fn attach_cursors(
    items: &mut [Value],
    link_header: &str,
    method: Method,
    endpoint: &str,
    params: &Params,
) {
    for relation in parse_link_header(link_header) {
        match relation.rel.as_str() {
            "next" => {
                let Some(max_id) = capture(&MAX_ID, &relation.url) else {
                    debug!("Ignoring next link without max_id: {}", relation.url);
                    continue;
                };
                let mut next = params.clone();
                next.remove("since_id");
                next.insert("max_id", max_id);
                if let Some(Value::Record(last)) = items.last_mut() {
                    last.set_pagination_next(Cursor::new(method, endpoint, next));
                }
            }
            "prev" => {
                let Some(since_id) = capture(&SINCE_ID, &relation.url) else {
                    debug!("Ignoring prev link without since_id: {}", relation.url);
                    continue;
                };
                let mut prev = params.clone();
                prev.remove("max_id");
                prev.insert("since_id", since_id);
                if let Some(Value::Record(first)) = items.first_mut() {
                    first.set_pagination_prev(Cursor::new(method, endpoint, prev));
                }
            }
            other => debug!("Ignoring link relation '{}'", other),
        }
    }
}

fn capture(pattern: &Regex, url: &str) -> Option<String> {
    pattern
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
