//! Relay connection lifecycle.
//!
//! `connect` spawns a single background task that owns the socket for the
//! rest of the session: it drains an outbound channel and decodes inbound
//! frames straight into the shared [`MessageLog`]. Lifecycle changes reach
//! the foreground as [`RelayEvent`]s. There is no reconnect: once the
//! connection closes or errors, the session stays down and every further
//! `send` fails the not-connected check.

use futures_util::{SinkExt, StreamExt};
use kaiwa_core::{ClientMessage, ConnectionState, MessageLog, RelayMessage};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Lifecycle notifications for the user-visible status surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// Handshake finished; the connection is live.
    Opened,
    /// An inbound frame failed to decode. The frame is dropped; the
    /// connection stays open.
    Malformed(String),
    /// The connection failed. Terminal.
    Error(String),
    /// The relay closed the connection. Terminal.
    Closed,
}

/// Errors surfaced by [`RelayConnection`].
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The connection is not open; the frame was dropped without retry.
    #[error("not connected to the relay ({})", .0.label())]
    NotConnected(ConnectionState),
    /// `connect` was already called for this session.
    #[error("connection already started ({})", .0.label())]
    AlreadyConnected(ConnectionState),
    #[error("failed to encode outbound frame: {0}")]
    Encode(#[from] serde_json::Error),
}

type SharedState = Arc<Mutex<ConnectionState>>;

/// Manages the session's single connection to the relay endpoint.
pub struct RelayConnection {
    url: String,
    log: MessageLog,
    state: SharedState,
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl RelayConnection {
    /// A new, unconnected manager. Inbound messages will land in `log`.
    pub fn new(url: impl Into<String>, log: MessageLog) -> Self {
        Self {
            url: url.into(),
            log,
            state: Arc::new(Mutex::new(ConnectionState::Unconnected)),
            outbound: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the connection. Valid exactly once, from `Unconnected`; the
    /// returned receiver carries lifecycle events for the status surface.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&mut self) -> Result<mpsc::UnboundedReceiver<RelayEvent>, RelayError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != ConnectionState::Unconnected {
                return Err(RelayError::AlreadyConnected(*state));
            }
            *state = ConnectionState::Connecting;
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.outbound = Some(outbound_tx);

        tokio::spawn(run_connection(
            self.url.clone(),
            self.log.clone(),
            self.state.clone(),
            outbound_rx,
            event_tx,
        ));

        Ok(event_rx)
    }

    /// Transmit one frame. Requires the connection to be open; otherwise
    /// the frame is dropped and the caller gets [`RelayError::NotConnected`]
    /// to surface as a warning.
    pub fn send(&self, message: &ClientMessage) -> Result<(), RelayError> {
        let state = self.state();
        if !state.is_open() {
            return Err(RelayError::NotConnected(state));
        }
        let outbound = self
            .outbound
            .as_ref()
            .ok_or(RelayError::NotConnected(state))?;
        let text = message.encode()?;
        // The task exiting flips the state; a send racing that is dropped
        // like any other not-open send.
        outbound
            .send(text)
            .map_err(|_| RelayError::NotConnected(self.state()))
    }
}

async fn run_connection(
    url: String,
    log: MessageLog,
    state: SharedState,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<RelayEvent>,
) {
    let (ws, _) = match connect_async(&url).await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!("connect to {} failed: {}", url, e);
            set_state(&state, ConnectionState::Errored);
            let _ = events.send(RelayEvent::Error(e.to_string()));
            return;
        }
    };

    set_state(&state, ConnectionState::Open);
    let _ = events.send(RelayEvent::Opened);
    tracing::debug!("connected to {}", url);

    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            frame = outbound_rx.recv() => match frame {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        tracing::warn!("send failed: {}", e);
                        set_state(&state, ConnectionState::Errored);
                        let _ = events.send(RelayEvent::Error(e.to_string()));
                        break;
                    }
                }
                // Connection handle dropped; the session is over.
                None => break,
            },

            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => match RelayMessage::decode(&text) {
                    Ok(message) => log.push(message),
                    Err(e) => {
                        tracing::warn!("malformed frame: {}", e);
                        let _ = events.send(RelayEvent::Malformed(e.to_string()));
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!("relay closed the connection");
                    set_state(&state, ConnectionState::Closed);
                    let _ = events.send(RelayEvent::Closed);
                    break;
                }
                // Ping/pong are answered by tungstenite; binary frames are
                // not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("receive failed: {}", e);
                    set_state(&state, ConnectionState::Errored);
                    let _ = events.send(RelayEvent::Error(e.to_string()));
                    break;
                }
            },
        }
    }
}

fn set_state(state: &SharedState, next: ConnectionState) {
    *state.lock().unwrap_or_else(PoisonError::into_inner) = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaiwa_core::Role;

    #[test]
    fn send_before_connect_is_dropped() {
        let log = MessageLog::new();
        let conn = RelayConnection::new("ws://127.0.0.1:1", log.clone());
        let frame = ClientMessage::compose(Role::User1, "안녕");

        let err = conn.send(&frame).unwrap_err();
        assert!(matches!(
            err,
            RelayError::NotConnected(ConnectionState::Unconnected)
        ));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn connect_is_one_shot() {
        let mut conn = RelayConnection::new("ws://127.0.0.1:1", MessageLog::new());
        let _events = conn.connect().unwrap();
        assert!(matches!(conn.connect(), Err(RelayError::AlreadyConnected(_))));
    }

    #[tokio::test]
    async fn failed_connect_is_terminal() {
        // Nothing listens on this port; the handshake fails fast.
        let mut conn = RelayConnection::new("ws://127.0.0.1:1", MessageLog::new());
        let mut events = conn.connect().unwrap();

        match events.recv().await {
            Some(RelayEvent::Error(_)) => {}
            other => panic!("expected an error event, got {other:?}"),
        }
        assert_eq!(conn.state(), ConnectionState::Errored);

        let frame = ClientMessage::compose(Role::User2, "こんにちは");
        assert!(matches!(
            conn.send(&frame),
            Err(RelayError::NotConnected(ConnectionState::Errored))
        ));
    }
}
