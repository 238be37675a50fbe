//! Exchange tests against an in-process relay.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use kaiwa_core::{ClientMessage, ConnectionState, MessageLog, RelayMessage, Role};
use kaiwa_client::{RelayConnection, RelayError, RelayEvent};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

type ServerWs = WebSocketStream<TcpStream>;

/// Bind a one-connection relay stub; returns its URL and the accepted
/// socket once a client arrives.
async fn boot_relay() -> (String, oneshot::Receiver<ServerWs>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = tx.send(ws);
    });
    (format!("ws://{addr}"), rx)
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<RelayEvent>) -> RelayEvent {
    timeout(TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for a relay event")
        .expect("event channel closed")
}

/// Read the next text frame the relay received, as JSON.
async fn read_json(ws: &mut ServerWs) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// The receive task appends without notifying; poll until `n` entries land.
async fn wait_for_log(log: &MessageLog, n: usize) {
    timeout(TIMEOUT, async {
        while log.len() < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for log entries");
}

#[tokio::test]
async fn outbound_frame_carries_role_metadata() {
    let (url, server) = boot_relay().await;
    let log = MessageLog::new();
    let mut conn = RelayConnection::new(&url, log);
    let mut events = conn.connect().unwrap();

    assert_eq!(next_event(&mut events).await, RelayEvent::Opened);
    assert_eq!(conn.state(), ConnectionState::Open);

    conn.send(&ClientMessage::compose(Role::User1, "안녕")).unwrap();

    let mut ws = server.await.unwrap();
    assert_eq!(
        read_json(&mut ws).await,
        json!({
            "action": "sendmessage",
            "user": "user1",
            "content": "안녕",
            "source_lang": "ko",
            "target_lang": "ja",
        })
    );
}

#[tokio::test]
async fn echoed_frame_lands_in_log_as_one_line() {
    let (url, server) = boot_relay().await;
    let log = MessageLog::new();
    let mut conn = RelayConnection::new(&url, log.clone());
    let mut events = conn.connect().unwrap();
    assert_eq!(next_event(&mut events).await, RelayEvent::Opened);

    conn.send(&ClientMessage::compose(Role::User1, "안녕")).unwrap();

    let mut ws = server.await.unwrap();
    read_json(&mut ws).await;
    ws.send(Message::text(r#"{"user":"user2","content":"こんにちは"}"#))
        .await
        .unwrap();

    wait_for_log(&log, 1).await;
    let entries = log.snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].to_string(), "user2: こんにちは");
}

#[tokio::test]
async fn inbound_frames_keep_delivery_order() {
    let (url, server) = boot_relay().await;
    let log = MessageLog::new();
    let mut conn = RelayConnection::new(&url, log.clone());
    let mut events = conn.connect().unwrap();
    assert_eq!(next_event(&mut events).await, RelayEvent::Opened);

    let mut ws = server.await.unwrap();
    for i in 0..5 {
        let frame = serde_json::to_string(&RelayMessage::new("user2", format!("msg {i}"))).unwrap();
        ws.send(Message::text(frame)).await.unwrap();
    }

    wait_for_log(&log, 5).await;
    let contents: Vec<String> = log.snapshot().into_iter().map(|m| m.content).collect();
    assert_eq!(contents, ["msg 0", "msg 1", "msg 2", "msg 3", "msg 4"]);
}

#[tokio::test]
async fn malformed_frame_is_reported_and_skipped() {
    let (url, server) = boot_relay().await;
    let log = MessageLog::new();
    let mut conn = RelayConnection::new(&url, log.clone());
    let mut events = conn.connect().unwrap();
    assert_eq!(next_event(&mut events).await, RelayEvent::Opened);

    let mut ws = server.await.unwrap();
    ws.send(Message::text("not a frame")).await.unwrap();
    ws.send(Message::text(r#"{"user":"user2","content":"まだ生きてる"}"#))
        .await
        .unwrap();

    assert!(matches!(
        next_event(&mut events).await,
        RelayEvent::Malformed(_)
    ));

    // The connection survives the bad frame and the good one still lands.
    wait_for_log(&log, 1).await;
    assert_eq!(log.snapshot()[0].to_string(), "user2: まだ生きてる");
    assert_eq!(conn.state(), ConnectionState::Open);
}

#[tokio::test]
async fn relay_close_is_terminal() {
    let (url, server) = boot_relay().await;
    let log = MessageLog::new();
    let mut conn = RelayConnection::new(&url, log.clone());
    let mut events = conn.connect().unwrap();
    assert_eq!(next_event(&mut events).await, RelayEvent::Opened);

    let mut ws = server.await.unwrap();
    ws.close(None).await.unwrap();

    assert_eq!(next_event(&mut events).await, RelayEvent::Closed);
    assert_eq!(conn.state(), ConnectionState::Closed);

    // No reconnect: sends keep failing and nothing is appended.
    let err = conn.send(&ClientMessage::compose(Role::User1, "안녕")).unwrap_err();
    assert!(matches!(err, RelayError::NotConnected(ConnectionState::Closed)));
    assert!(log.is_empty());
    assert!(matches!(conn.connect(), Err(RelayError::AlreadyConnected(_))));
}
