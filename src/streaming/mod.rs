//! Streaming API
//!
//! # Overview
//!
//! A streaming session resolves the instance's streaming server, opens a
//! long-lived chunked GET against one of the streaming endpoints and hands
//! the byte stream to a [`StreamListener`]. Sessions run either inline
//! ([`Mastodon::stream`](crate::Mastodon::stream)) or on a background task
//! ([`Mastodon::stream_background`](crate::Mastodon::stream_background))
//! that can be cancelled through its [`StreamHandle`].
//!
//! [`EventDispatcher`] turns the raw bytes into server-sent events and
//! routes them to an [`EventListener`]; [`CallbackListener`] is a ready-made
//! listener built from closures.

mod events;
mod session;
mod stream;

pub use events::{CallbackListener, EventDispatcher, EventListener};
pub use session::{StreamHandle, StreamTarget};
pub use stream::{EventStream, StreamListener};
