//! The raw event stream and the listener seam

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Consumer of an open streaming connection
///
/// `handle_stream` owns the stream until it returns. Returning `Ok(())`
/// ends the session normally.
#[async_trait]
pub trait StreamListener: Send {
    async fn handle_stream(&mut self, stream: EventStream) -> Result<()>;
}

/// Byte chunks from an open streaming connection
///
/// Once the owning handle is closed, every further read yields a network
/// error so the listener unwinds.
pub struct EventStream {
    chunks: ChunkStream,
    token: CancellationToken,
}

impl EventStream {
    /// Wrap any chunk stream; used for connections and for replaying
    /// captured traffic
    pub fn new<S>(chunks: S, token: CancellationToken) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            chunks: Box::pin(chunks),
            token,
        }
    }

    pub(crate) fn from_response(response: reqwest::Response, token: CancellationToken) -> Self {
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::transport("Streaming connection failed", e)));
        Self::new(chunks, token)
    }

    /// Next chunk, `None` when the server ended the stream
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        if self.token.is_cancelled() {
            return Some(Err(closed()));
        }
        tokio::select! {
            biased;
            () = self.token.cancelled() => Some(Err(closed())),
            chunk = self.chunks.next() => chunk,
        }
    }

    /// Whether the session was closed from the outside
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn closed() -> Error {
    Error::network("stream connection closed")
}
