use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let [header_area, log_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(app, frame, header_area);
    render_log(app, frame, log_area);
    render_input(app, frame, input_area);
    render_status(app, frame, status_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" 실시간 번역 채팅 ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(app.role.header()),
    ]);
    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// The full message log, oldest first, one `user: content` line each.
fn render_log(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .log
        .snapshot()
        .iter()
        .map(|message| ListItem::new(message.to_string()))
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} [Enter] ", app.role.submit_label()));

    let input = if app.input.is_empty() {
        Paragraph::new(app.role.input_placeholder()).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(app.input.as_str())
    };
    frame.render_widget(input.block(block), area);

    if !app.input.is_empty() {
        let cursor_x = app.input.chars().count() as u16;
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.connection_state();
    let state_style = if state.is_open() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let line = Line::from(vec![
        Span::styled(format!(" [{}] ", state.label()), state_style),
        Span::raw(app.status.clone().unwrap_or_default()),
        Span::styled(
            " · Ctrl-R 새로고침 · Esc 종료 ",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
