//! HTTP client module
//!
//! Provides the request engine every API call goes through.
//!
//! # Features
//!
//! - **Parameter placement**: query string for reads, form or multipart body for writes
//! - **Rate Limiting**: header-driven quota tracking with throw, wait and pace policies
//! - **Error classification**: 404, 401 and other failures map to typed errors
//! - **Pagination**: Link headers become cursors on the returned page

mod client;
mod rate_limit;

pub use client::{FilePart, HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig, RateState};
