//! Streaming sessions: endpoint resolution, connection and workers

use super::stream::{EventStream, StreamListener};
use crate::api::check_tag;
use crate::client::Mastodon;
use crate::error::{Error, Result};
use crate::params::{Id, IntoId};
use crate::version::Version;
use reqwest::StatusCode;
use std::fmt;
use std::str::FromStr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Which stream to subscribe to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    /// Home timeline and notifications of the logged-in user
    User,
    /// All public statuses
    Public,
    /// Public statuses from this instance
    Local,
    /// Public statuses with a hashtag, given without its leading `#`
    Hashtag(String),
    /// Statuses by the members of a list
    List(Id),
}

impl StreamTarget {
    /// Endpoint path including the query string
    pub fn path(&self) -> String {
        match self {
            StreamTarget::User => "/api/v1/streaming/user".to_string(),
            StreamTarget::Public => "/api/v1/streaming/public".to_string(),
            StreamTarget::Local => "/api/v1/streaming/public/local".to_string(),
            StreamTarget::Hashtag(tag) => {
                let tag: String = url::form_urlencoded::byte_serialize(tag.as_bytes()).collect();
                format!("/api/v1/streaming/hashtag?tag={tag}")
            }
            StreamTarget::List(id) => format!("/api/v1/streaming/list?list={id}"),
        }
    }

    /// Introduced and last-changed versions
    fn versions(&self) -> (Version, Version) {
        match self {
            StreamTarget::List(_) => (Version::new(2, 1, 0), Version::new(2, 1, 0)),
            _ => (Version::new(1, 1, 0), Version::new(1, 4, 2)),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            StreamTarget::Hashtag(tag) => check_tag(tag, "Tag"),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamTarget::User => f.write_str("user"),
            StreamTarget::Public => f.write_str("public"),
            StreamTarget::Local => f.write_str("local"),
            StreamTarget::Hashtag(tag) => write!(f, "hashtag:{tag}"),
            StreamTarget::List(id) => write!(f, "list:{id}"),
        }
    }
}

impl FromStr for StreamTarget {
    type Err = Error;

    /// Parses `user`, `public`, `local`, `hashtag:<tag>` and `list:<id>`
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            None => match s {
                "user" => Ok(Self::User),
                "public" => Ok(Self::Public),
                "local" => Ok(Self::Local),
                other => Err(Error::illegal_argument(format!("Unknown stream '{other}'"))),
            },
            Some(("hashtag", tag)) if !tag.is_empty() => Ok(Self::Hashtag(tag.to_string())),
            Some(("list", id)) if !id.is_empty() => Ok(Self::List(Id::new(id))),
            Some(_) => Err(Error::illegal_argument(format!("Unknown stream '{s}'"))),
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Handle to a stream running on a background task
///
/// Dropping the handle leaves the worker running; call [`close`](Self::close)
/// to stop it.
pub struct StreamHandle {
    token: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl StreamHandle {
    /// Ask the worker to stop and drop the connection
    ///
    /// The listener sees a closed-stream error, which the worker then
    /// discards.
    pub fn close(&self) {
        debug!("Closing stream");
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the worker is still running
    pub fn is_alive(&self) -> bool {
        !self.task.is_finished()
    }

    /// Wait for the worker and return the listener's result
    pub async fn join(self) -> Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(Error::Other(format!("Stream worker failed: {e}"))),
        }
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("closed", &self.is_closed())
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Turn an advertised websocket URL into the HTTP origin serving the stream
pub(crate) fn rewrite_streaming_url(advertised: &str) -> Result<String> {
    let unparseable = || {
        Error::api(
            200,
            "OK",
            format!("Could not parse streaming api location returned from server: {advertised}."),
        )
    };

    let url = Url::parse(advertised).map_err(|_| unparseable())?;
    let scheme = match url.scheme() {
        "wss" | "https" => "https",
        "ws" | "http" => "http",
        _ => return Err(unparseable()),
    };
    let host = url.host_str().ok_or_else(unparseable)?;
    Ok(match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    })
}

impl Mastodon {
    /// Base URL of the streaming server
    ///
    /// Instances may serve streams from a separate host, advertised as
    /// `urls.streaming_api` in the instance info.
    pub async fn streaming_base_url(&mut self) -> Result<String> {
        let instance = self.instance().await?;
        let base = match instance["urls"]["streaming_api"].as_str() {
            Some(advertised) if advertised.trim_end_matches('/') != self.api_base_url() => {
                debug!("Streaming redirected to {}", advertised);
                rewrite_streaming_url(advertised)?
            }
            _ => self.api_base_url().to_string(),
        };
        // The streaming server rejects double slashes in paths.
        Ok(base.trim_end_matches('/').to_string())
    }

    async fn connect_stream(&mut self, target: &StreamTarget) -> Result<EventStream> {
        let (introduced, changed) = target.versions();
        self.require_version(introduced, changed)?;
        target.validate()?;

        let url = format!("{}{}", self.streaming_base_url().await?, target.path());
        info!("Opening {} stream at {}", target, url);

        let req = self.http.inner().get(&url);
        let response = self
            .http
            .credentials()
            .apply(req)
            .send()
            .await
            .map_err(|e| Error::transport("Could not connect to streaming server", e))?;

        if response.status() != StatusCode::OK {
            let reason = response
                .status()
                .canonical_reason()
                .unwrap_or("unknown status");
            return Err(Error::network(format!(
                "Could not connect to streaming server: {reason}"
            )));
        }

        Ok(EventStream::from_response(response, CancellationToken::new()))
    }

    /// Stream into `listener` until the server ends the stream or the
    /// listener fails
    pub async fn stream<L>(&mut self, target: StreamTarget, listener: &mut L) -> Result<()>
    where
        L: StreamListener + ?Sized,
    {
        let events = self.connect_stream(&target).await?;
        listener.handle_stream(events).await
    }

    /// Stream into `listener` on a background task
    ///
    /// Connection errors surface here; errors after that are returned by
    /// [`StreamHandle::join`], except the one caused by closing the handle.
    pub async fn stream_background<L>(&mut self, target: StreamTarget, mut listener: L) -> Result<StreamHandle>
    where
        L: StreamListener + 'static,
    {
        let events = self.connect_stream(&target).await?;
        let token = events.token();
        let worker_token = token.clone();

        let task = tokio::spawn(async move {
            match listener.handle_stream(events).await {
                Err(e) if worker_token.is_cancelled() => {
                    debug!("Stream {} closed: {}", target, e);
                    Ok(())
                }
                Err(e) => {
                    warn!("Stream {} failed: {}", target, e);
                    Err(e)
                }
                Ok(()) => Ok(()),
            }
        });

        Ok(StreamHandle { token, task })
    }

    /// Events relevant to the logged-in user
    pub async fn stream_user<L: StreamListener + ?Sized>(&mut self, listener: &mut L) -> Result<()> {
        self.stream(StreamTarget::User, listener).await
    }

    pub async fn stream_public<L: StreamListener + ?Sized>(&mut self, listener: &mut L) -> Result<()> {
        self.stream(StreamTarget::Public, listener).await
    }

    pub async fn stream_local<L: StreamListener + ?Sized>(&mut self, listener: &mut L) -> Result<()> {
        self.stream(StreamTarget::Local, listener).await
    }

    pub async fn stream_hashtag<L: StreamListener + ?Sized>(
        &mut self,
        tag: &str,
        listener: &mut L,
    ) -> Result<()> {
        self.stream(StreamTarget::Hashtag(tag.to_string()), listener)
            .await
    }

    pub async fn stream_list<L: StreamListener + ?Sized>(
        &mut self,
        id: impl IntoId,
        listener: &mut L,
    ) -> Result<()> {
        let id = id.into_id()?;
        self.stream(StreamTarget::List(id), listener).await
    }
}
