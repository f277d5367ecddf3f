//! Server-sent event parsing and dispatch

use super::stream::{EventStream, StreamListener};
use crate::decode::{decode_body, Value};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::BytesMut;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Receiver of parsed streaming events
///
/// Every handler defaults to ignoring its event, except unknown event
/// names, which are rejected.
pub trait EventListener: Send {
    /// A new status
    fn on_update(&mut self, _status: Value) -> Result<()> {
        Ok(())
    }

    fn on_notification(&mut self, _notification: Value) -> Result<()> {
        Ok(())
    }

    /// A status was deleted; the payload is its id
    fn on_delete(&mut self, _status_id: Value) -> Result<()> {
        Ok(())
    }

    /// Keep-alive comment from the server
    fn on_heartbeat(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_unknown_event(&mut self, name: &str, _payload: Value) -> Result<()> {
        Err(Error::malformed_event(format!("Bad event type: {name}")))
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// [`StreamListener`] that parses server-sent events for an [`EventListener`]
///
/// Lines end in `\n`. A blank line dispatches the fields collected so far,
/// lines starting with `:` are heartbeats, and any other line is a
/// `key: value` field. Repeated keys are joined with `\n`.
pub struct EventDispatcher<L> {
    listener: L,
    buffer: BytesMut,
    fields: BTreeMap<String, String>,
}

impl<L: EventListener> EventDispatcher<L> {
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            buffer: BytesMut::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_inner(self) -> L {
        self.listener
    }

    /// Consume a chunk of raw bytes, dispatching every completed event
    ///
    /// Chunks may split lines and multi-byte characters anywhere.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(chunk);

        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw = self.buffer.split_to(end + 1);
            let line = std::str::from_utf8(&raw[..end])
                .map_err(|_| Error::malformed_event("Malformed UTF-8"))?;
            let line = line.strip_suffix('\r').unwrap_or(line);

            if line.is_empty() {
                self.dispatch()?;
            } else if line.starts_with(':') {
                trace!("Stream heartbeat");
                self.listener.on_heartbeat()?;
            } else {
                self.add_field(line);
            }
        }
        Ok(())
    }

    fn add_field(&mut self, line: &str) {
        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        self.fields
            .entry(key.to_string())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    fn dispatch(&mut self) -> Result<()> {
        let fields = std::mem::take(&mut self.fields);
        if fields.is_empty() {
            return Ok(());
        }

        let name = fields
            .get("event")
            .ok_or_else(|| Error::malformed_event("Missing field: event"))?;
        let data = fields
            .get("data")
            .ok_or_else(|| Error::malformed_event("Missing field: data"))?;
        let payload = decode_body(data)
            .map_err(|e| Error::malformed_event(format!("Bad JSON: {e}: {data}")))?;

        debug!("Stream event '{}'", name);
        match name.as_str() {
            "update" => self.listener.on_update(payload),
            "notification" => self.listener.on_notification(payload),
            "delete" => self.listener.on_delete(payload),
            other => self.listener.on_unknown_event(other, payload),
        }
    }
}

#[async_trait]
impl<L: EventListener> StreamListener for EventDispatcher<L> {
    async fn handle_stream(&mut self, mut stream: EventStream) -> Result<()> {
        while let Some(chunk) = stream.next_chunk().await {
            self.feed(&chunk?)?;
        }
        Ok(())
    }
}

impl<L: std::fmt::Debug> std::fmt::Debug for EventDispatcher<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener", &self.listener)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Callback Listener
// ============================================================================

type Handler = Box<dyn FnMut(Value) + Send>;

/// [`EventListener`] built from optional closures
///
/// The local-update handler receives only statuses by accounts on this
/// instance, i.e. whose `account.acct` carries no `@domain`.
#[derive(Default)]
pub struct CallbackListener {
    update: Option<Handler>,
    local_update: Option<Handler>,
    delete: Option<Handler>,
    notification: Option<Handler>,
}

impl CallbackListener {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_update(mut self, handler: impl FnMut(Value) + Send + 'static) -> Self {
        self.update = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_local_update(mut self, handler: impl FnMut(Value) + Send + 'static) -> Self {
        self.local_update = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_delete(mut self, handler: impl FnMut(Value) + Send + 'static) -> Self {
        self.delete = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn on_notification(mut self, handler: impl FnMut(Value) + Send + 'static) -> Self {
        self.notification = Some(Box::new(handler));
        self
    }
}

impl EventListener for CallbackListener {
    fn on_update(&mut self, status: Value) -> Result<()> {
        if let Some(handler) = &mut self.update {
            handler(status.clone());
        }

        if let Some(handler) = &mut self.local_update {
            let is_local = status["account"]["acct"]
                .as_str()
                .map(|acct| !acct.contains('@'))
                .ok_or_else(|| Error::malformed_event("received bad update"))?;
            if is_local {
                handler(status);
            }
        }
        Ok(())
    }

    fn on_delete(&mut self, status_id: Value) -> Result<()> {
        if let Some(handler) = &mut self.delete {
            handler(status_id);
        }
        Ok(())
    }

    fn on_notification(&mut self, notification: Value) -> Result<()> {
        if let Some(handler) = &mut self.notification {
            handler(notification);
        }
        Ok(())
    }
}

impl std::fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackListener")
            .field("update", &self.update.is_some())
            .field("local_update", &self.local_update.is_some())
            .field("delete", &self.delete.is_some())
            .field("notification", &self.notification.is_some())
            .finish()
    }
}
