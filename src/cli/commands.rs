//! CLI commands and argument parsing

use crate::streaming::StreamTarget;
use crate::types::Visibility;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for a Mastodon instance
#[derive(Parser, Debug)]
#[command(name = "mastodon-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Instance base URL, overrides the config file
    #[arg(short, long, global = true)]
    pub base_url: Option<String>,

    /// Access token, overrides the config file
    #[arg(long, global = true)]
    pub access_token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show instance information
    Instance,

    /// Read a timeline
    Timeline {
        /// home, local, public, tag/<hashtag> or list/<id>
        #[arg(default_value = "home")]
        name: String,

        /// Statuses per page
        #[arg(long)]
        limit: Option<u32>,

        /// Follow pagination to the end of the timeline
        #[arg(long)]
        all: bool,
    },

    /// Post a status
    Toot {
        /// Status text
        text: String,

        /// direct, private, unlisted or public
        #[arg(long)]
        visibility: Option<Visibility>,

        /// Content warning
        #[arg(long)]
        spoiler: Option<String>,
    },

    /// Print streaming events until interrupted
    Stream {
        /// user, public, local, hashtag:<tag> or list:<id>
        #[arg(default_value = "user")]
        target: StreamTarget,
    },

    /// Register a new application
    Register {
        /// Application name
        #[arg(long)]
        name: String,

        /// Application website
        #[arg(long)]
        website: Option<String>,

        /// Write the client id and secret to this file
        #[arg(long)]
        to_file: Option<PathBuf>,
    },

    /// Log in with a user name and password
    Login {
        /// Account e-mail address
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// Write the access token to this file
        #[arg(long)]
        to_file: Option<PathBuf>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Indented JSON
    Pretty,
}
