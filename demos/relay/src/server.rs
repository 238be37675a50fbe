//! Broadcast relay implementation.

use futures_util::{SinkExt, StreamExt};
use kaiwa_core::{ClientMessage, RelayMessage, SEND_ACTION};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

pub async fn run(addr: SocketAddr) -> anyhow::Result<()> {
    // Frames are tagged with the sender so delivery can skip it.
    let (broadcast_tx, _) = broadcast::channel::<(SocketAddr, String)>(100);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on ws://{}", addr);

    loop {
        let (stream, client_addr) = listener.accept().await?;
        let broadcast_tx = broadcast_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, client_addr, broadcast_tx).await {
                tracing::warn!("Connection error from {}: {}", client_addr, e);
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    broadcast_tx: broadcast::Sender<(SocketAddr, String)>,
) -> anyhow::Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut stream) = ws.split();
    let mut broadcast_rx = broadcast_tx.subscribe();

    tracing::debug!("New connection from {}", addr);

    loop {
        tokio::select! {
            // Incoming frame from this client
            msg = stream.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                };

                if let Message::Text(text) = msg {
                    let frame: ClientMessage = match serde_json::from_str(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!("Invalid frame from {}: {}", addr, e);
                            continue;
                        }
                    };

                    if frame.action != SEND_ACTION {
                        tracing::warn!("Unknown action {:?} from {}", frame.action, addr);
                        continue;
                    }

                    tracing::info!("{} -> {}: {}", frame.source_lang, frame.target_lang, frame.content);

                    // Deliver the reduced shape to everyone else.
                    let delivery = RelayMessage::new(frame.user.as_str(), frame.content);
                    let _ = broadcast_tx.send((addr, serde_json::to_string(&delivery)?));
                }
            }

            // Frame from another connection
            msg = broadcast_rx.recv() => {
                if let Ok((origin, text)) = msg {
                    if origin != addr {
                        sink.send(Message::Text(text.into())).await?;
                    }
                }
            }
        }
    }

    tracing::debug!("Connection closed: {}", addr);
    Ok(())
}
