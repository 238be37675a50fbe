//! Client-side connection management for the kaiwa relay chat.
//!
//! One [`RelayConnection`] per session. It owns the session's single
//! WebSocket connection: a background task drives the socket while the
//! foreground keeps rendering, and the two meet only at the shared
//! [`kaiwa_core::MessageLog`] and the [`RelayEvent`] channel.

mod connection;

pub use connection::{RelayConnection, RelayError, RelayEvent};
