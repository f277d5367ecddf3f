//! CLI module
//!
//! Command-line interface over the client.
//!
//! # Commands
//!
//! - `instance` - Show instance information
//! - `timeline` - Read a timeline, optionally draining all pages
//! - `toot` - Post a status
//! - `stream` - Print streaming events
//! - `register` - Register an application
//! - `login` - Obtain an access token

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
