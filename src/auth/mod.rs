//! Authentication module
//!
//! Supports: app registration, password / authorization-code / refresh-token
//! grants, and the flat credential files the client can load and persist.
//!
//! `Credentials` holds everything a client needs to authenticate and tracks
//! token expiry locally. Expiry is advisory only: nothing refreshes a token
//! automatically.

mod credentials;
mod oauth;
mod types;

pub use credentials::{
    read_client_file, read_token_file, write_client_file, write_token_file, Credentials,
};
pub use types::{AppRegistration, Grant, LoginRequest, TokenResponse, DEFAULT_REDIRECT_URI, DEFAULT_SCOPES};

#[cfg(test)]
mod tests;
