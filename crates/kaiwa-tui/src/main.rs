//! Terminal client for the kaiwa bilingual relay chat.
//!
//! One process run is one session: resolve the role, open the relay
//! connection, then render until quit. Run as either participant:
//!
//!   kaiwa --endpoint ws://localhost:8001 --role user1
//!   kaiwa --endpoint ws://localhost:8001 --role user2

mod app;
mod tui;
mod ui;

use clap::Parser;
use kaiwa_core::Role;
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "kaiwa", about = "Real-time bilingual relay chat client")]
struct Cli {
    /// Relay endpoint URL (ws:// or wss://).
    #[arg(long, env = "RELAY_ENDPOINT_URL")]
    endpoint: String,

    /// Participant role: "user1" (ko -> ja) or "user2" (ja -> ko).
    #[arg(long, env = "KAIWA_ROLE")]
    role: Role,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing endpoint or an unknown role abort here, before the terminal
    // is touched.
    let cli = Cli::parse();

    // Diagnostics stay on stderr and off unless RUST_LOG is set; the chat
    // surface owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = App::new(cli.role, &cli.endpoint).run(&mut terminal).await;
    tui::restore()?;
    result
}
