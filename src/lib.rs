// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Mastodon API client
//!
//! An async client for the Mastodon REST and streaming APIs.
//!
//! ## Features
//!
//! - **Rate Limiting**: `throw`, `wait` and `pace` policies driven by the
//!   server's quota headers
//! - **Version Gating**: every operation checks the server version before
//!   sending anything
//! - **Pagination**: Link-header cursors attached to returned pages, with
//!   `fetch_next`, `fetch_previous` and `fetch_remaining`
//! - **Streaming**: server-sent events dispatched to listeners, inline or on
//!   a background task
//! - **OAuth**: app registration, password, authorization code and refresh
//!   token grants, with flat credential files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mastodon_client::{ClientConfig, Mastodon, PageParams, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::builder()
//!         .api_base_url("mastodon.social")
//!         .access_token_file("usercred.secret")
//!         .build();
//!     let mut client = Mastodon::new(config).await?;
//!
//!     let first = client.timeline_home(&PageParams::new().limit(40)).await?;
//!     let everything = client.fetch_remaining(&first).await?;
//!     println!("{} statuses", everything.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Mastodon                               │
//! │  api::*  (version gate → params → engine)   streaming::*        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Decode   │  Streaming  │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ OAuth    │ Form/Query│ Link header   │ Ids       │ SSE parser  │
//! │ Files    │ Multipart │ Cursors       │ Dates     │ Listeners   │
//! │ Expiry   │ Rate Limit│ Drain         │ Records   │ Workers     │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Server version parsing and the version gate
pub mod version;

/// Request parameters and identifiers
pub mod params;

/// Response decoding into records
pub mod decode;

/// OAuth and credential files
pub mod auth;

/// HTTP request engine with rate limiting
pub mod http;

/// Link-header pagination
pub mod pagination;

/// Client configuration
pub mod config;

/// The client type
pub mod client;

/// REST resource operations
pub mod api;

/// Streaming API
pub mod streaming;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::{PageParams, StatusPost};
pub use client::Mastodon;
pub use config::ClientConfig;
pub use decode::{Record, Value};
pub use pagination::Cursor;
pub use params::{Id, Params};
pub use streaming::{CallbackListener, EventListener, StreamTarget};
pub use version::Version;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
