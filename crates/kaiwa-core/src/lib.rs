//! Core types for the kaiwa relay chat.
//!
//! This crate provides the domain primitives: participant roles, the wire
//! frames exchanged with the relay, and the session message log. The
//! connection itself lives in `kaiwa-client`; the terminal surface in
//! `kaiwa-tui`.

mod log;
mod message;
mod role;

pub use log::MessageLog;
pub use message::{ClientMessage, RelayMessage, SEND_ACTION};
pub use role::{Role, RoleParseError};

/// Connection lifecycle state.
///
/// Owned by the connection manager. At most one connection exists per
/// session; `Closed` and `Errored` are terminal — there is no reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been opened yet.
    Unconnected,
    /// Handshake in progress.
    Connecting,
    /// Normal operation; frames may be sent.
    Open,
    /// The relay closed the connection.
    Closed,
    /// The connection failed.
    Errored,
}

impl ConnectionState {
    /// Whether outbound frames may be transmitted.
    pub fn is_open(self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Short label for the status line.
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Unconnected => "unconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
            ConnectionState::Errored => "errored",
        }
    }
}
