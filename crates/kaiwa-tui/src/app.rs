use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kaiwa_client::{RelayConnection, RelayEvent};
use kaiwa_core::{ClientMessage, ConnectionState, MessageLog, Role};
use tokio::sync::mpsc;

use crate::tui::{AppEvent, EventHandler, Tui};
use crate::ui;

/// Per-session state: one role, one log, one connection.
///
/// Constructed once at startup and dropped when the session ends; nothing
/// survives a restart.
pub struct App {
    pub role: Role,
    pub log: MessageLog,
    pub input: String,
    /// Latest user-visible notice (connection lifecycle, dropped frames).
    pub status: Option<String>,
    pub should_quit: bool,
    conn: RelayConnection,
    relay_events: Option<mpsc::UnboundedReceiver<RelayEvent>>,
}

impl App {
    pub fn new(role: Role, endpoint: &str) -> Self {
        let log = MessageLog::new();
        let conn = RelayConnection::new(endpoint, log.clone());
        Self {
            role,
            log,
            input: String::new(),
            status: None,
            should_quit: false,
            conn,
            relay_events: None,
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.conn.state()
    }

    /// Connect once, then redraw on every interaction until quit.
    ///
    /// Inbound messages are appended by the connection task without waking
    /// this loop; they appear on the next keypress or on Ctrl-R.
    pub async fn run(mut self, terminal: &mut Tui) -> Result<()> {
        match self.conn.connect() {
            Ok(events) => self.relay_events = Some(events),
            Err(e) => self.status = Some(e.to_string()),
        }

        let mut events = EventHandler::new();

        loop {
            self.drain_relay_events();
            terminal.draw(|frame| ui::render(&mut self, frame))?;

            let Some(event) = events.next().await else { break };
            match event {
                AppEvent::Key(key) => self.handle_key(key),
                // Redrawn at the top of the loop.
                AppEvent::Resize(..) => {}
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            // Manual refresh: nothing to do, the loop turn redraws.
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {}
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    /// Compose and transmit the current input. Empty input is a no-op; a
    /// not-connected send drops the frame and leaves a warning.
    fn submit(&mut self) {
        if self.input.is_empty() {
            return;
        }
        let message = ClientMessage::compose(self.role, self.input.as_str());
        self.input.clear();
        if let Err(e) = self.conn.send(&message) {
            self.status = Some(e.to_string());
        }
    }

    /// Pull pending lifecycle notifications into the status line. Chat
    /// messages land in the log directly and are not delivered here.
    fn drain_relay_events(&mut self) {
        let Some(events) = self.relay_events.as_mut() else {
            return;
        };
        while let Ok(event) = events.try_recv() {
            self.status = Some(match event {
                RelayEvent::Opened => "connection opened".to_string(),
                RelayEvent::Closed => "connection closed".to_string(),
                RelayEvent::Error(reason) => format!("connection error: {reason}"),
                RelayEvent::Malformed(reason) => format!("dropped malformed frame: {reason}"),
            });
        }
    }
}
