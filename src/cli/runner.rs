//! CLI runner - executes commands

use crate::api::{PageParams, StatusPost};
use crate::auth::{AppRegistration, LoginRequest};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::Mastodon;
use crate::config::{protocolize, ClientConfig};
use crate::decode::Value;
use crate::error::Result as ClientResult;
use crate::streaming::{EventDispatcher, EventListener, StreamTarget};
use crate::types::Visibility;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Instance => self.instance().await,
            Commands::Timeline { name, limit, all } => self.timeline(name, *limit, *all).await,
            Commands::Toot {
                text,
                visibility,
                spoiler,
            } => self.toot(text, *visibility, spoiler.as_deref()).await,
            Commands::Stream { target } => self.stream(target.clone()).await,
            Commands::Register {
                name,
                website,
                to_file,
            } => {
                self.register(name, website.as_deref(), to_file.as_deref())
                    .await
            }
            Commands::Login {
                username,
                password,
                to_file,
            } => self.login(username, password, to_file.as_deref()).await,
        }
    }

    /// Config file merged with command-line overrides
    fn config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.cli.base_url {
            config.api_base_url = protocolize(url);
        }
        if let Some(token) = &self.cli.access_token {
            config.access_token = Some(token.clone());
            config.access_token_file = None;
        }
        Ok(config)
    }

    async fn client(&self) -> Result<Mastodon> {
        let config = self.config()?;
        let base_url = config.api_base_url.clone();
        Mastodon::new(config)
            .await
            .with_context(|| format!("Failed to connect to {base_url}"))
    }

    fn print(&self, value: &impl Serialize) -> Result<()> {
        println!("{}", render(self.cli.format, value)?);
        Ok(())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    async fn instance(&self) -> Result<()> {
        let mut client = self.client().await?;
        let instance = client.instance().await?;
        self.print(&instance)
    }

    async fn timeline(&self, name: &str, limit: Option<u32>, all: bool) -> Result<()> {
        let mut client = self.client().await?;
        let mut page = PageParams::new();
        if let Some(limit) = limit {
            page = page.limit(limit);
        }

        let first = client.timeline(name, &page).await?;
        let statuses = if all {
            client.fetch_remaining(&first).await?
        } else {
            first
        };

        info!("Fetched {} statuses from {}", statuses.len(), name);
        for status in &statuses {
            self.print(status)?;
        }
        Ok(())
    }

    async fn toot(&self, text: &str, visibility: Option<Visibility>, spoiler: Option<&str>) -> Result<()> {
        let mut client = self.client().await?;
        let mut post = StatusPost::new(text);
        if let Some(visibility) = visibility {
            post = post.visibility(visibility);
        }
        if let Some(spoiler) = spoiler {
            post = post.spoiler_text(spoiler);
        }
        let status = client.status_post(&post).await?;
        self.print(&status)
    }

    async fn stream(&self, target: StreamTarget) -> Result<()> {
        let mut client = self.client().await?;
        let mut dispatcher = EventDispatcher::new(EventPrinter {
            format: self.cli.format,
        });

        tokio::select! {
            result = client.stream(target.clone(), &mut dispatcher) => {
                result.with_context(|| format!("Stream {target} failed"))?;
                info!("Stream {} ended", target);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing stream {}", target);
            }
        }
        Ok(())
    }

    async fn register(&self, name: &str, website: Option<&str>, to_file: Option<&Path>) -> Result<()> {
        let config = self.config()?;
        let mut registration = AppRegistration::new(name);
        if let Some(website) = website {
            registration = registration.website(website);
        }
        if let Some(path) = to_file {
            registration = registration.to_file(path);
        }

        let (client_id, client_secret) =
            Mastodon::create_app(&config.api_base_url, &registration, config.timeout())
                .await
                .context("App registration failed")?;
        self.print(&json!({
            "client_id": client_id,
            "client_secret": client_secret,
        }))
    }

    async fn login(&self, username: &str, password: &str, to_file: Option<&Path>) -> Result<()> {
        let mut client = self.client().await?;
        let mut request = LoginRequest::password(username, password);
        if let Some(path) = to_file {
            request = request.to_file(path);
        }

        let token = client.log_in(request).await.context("Login failed")?;
        self.print(&json!({ "access_token": token }))
    }
}

fn render(format: OutputFormat, value: &impl Serialize) -> Result<String> {
    let out = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
    };
    Ok(out)
}

/// Prints every streaming event as `{"event": ..., "payload": ...}`
struct EventPrinter {
    format: OutputFormat,
}

impl EventPrinter {
    fn emit(&self, event: &str, payload: Value) -> ClientResult<()> {
        let line = render(self.format, &json!({ "event": event, "payload": payload.to_json() }))
            .map_err(|e| crate::Error::Other(e.to_string()))?;
        println!("{line}");
        Ok(())
    }
}

impl EventListener for EventPrinter {
    fn on_update(&mut self, status: Value) -> ClientResult<()> {
        self.emit("update", status)
    }

    fn on_notification(&mut self, notification: Value) -> ClientResult<()> {
        self.emit("notification", notification)
    }

    fn on_delete(&mut self, status_id: Value) -> ClientResult<()> {
        self.emit("delete", status_id)
    }

    fn on_unknown_event(&mut self, name: &str, payload: Value) -> ClientResult<()> {
        // Print unknown events instead of failing.
        self.emit(name, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_timeline_command() {
        let cli = Cli::parse_from([
            "mastodon-client",
            "--base-url",
            "example.social",
            "timeline",
            "local",
            "--limit",
            "20",
            "--all",
        ]);
        match cli.command {
            Commands::Timeline { name, limit, all } => {
                assert_eq!(name, "local");
                assert_eq!(limit, Some(20));
                assert!(all);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_stream_target() {
        let cli = Cli::parse_from(["mastodon-client", "stream", "hashtag:rust"]);
        match cli.command {
            Commands::Stream { target } => assert_eq!(target, StreamTarget::Hashtag("rust".into())),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["mastodon-client", "stream", "firehose"]).is_err());
    }

    #[test]
    fn test_config_overrides() {
        let cli = Cli::parse_from([
            "mastodon-client",
            "--base-url",
            "example.social/",
            "--access-token",
            "abc",
            "instance",
        ]);
        let config = Runner::new(cli).config().unwrap();
        assert_eq!(config.api_base_url, "https://example.social");
        assert_eq!(config.access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_render_formats() {
        let value = json!({"id": 1});
        assert_eq!(render(OutputFormat::Json, &value).unwrap(), r#"{"id":1}"#);
        assert!(render(OutputFormat::Pretty, &value).unwrap().contains('\n'));
    }
}
