//! Local stand-in for the managed relay.
//!
//! Accepts WebSocket connections and forwards each `sendmessage` frame to
//! every other connected client. The deployed relay also machine-translates
//! `content` between the role language pairs; this stand-in forwards the
//! text untranslated.
//!
//! Run:
//!   cargo run --bin kaiwa-relay -- --port 8001

mod server;

use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("kaiwa_relay=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let port = parse_arg(&args, "--port").unwrap_or(8001);
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();

    server::run(addr).await
}

fn parse_arg(args: &[String], flag: &str) -> Option<u16> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
