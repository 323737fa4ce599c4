//! Transport bar widget - shows BPM, play state, note division and position

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use swinglab::Session;

pub fn render_transport(frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default().title(" swinglab ").borders(Borders::ALL);

    let running = session.is_running();
    let play_symbol = if running { "▶" } else { "■" };
    let play_state_str = if running { "Playing" } else { "Stopped" };
    let steps = session.pattern().step_count().steps();

    let position = match session.current_step() {
        Some(step) => format!("Step {:>2}/{}  ", step + 1, steps),
        None => format!("Step  -/{}  ", steps),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", session.bpm()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if running { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(position, Style::default().fg(Color::White)),
        Span::styled(
            format!("1/{} notes  ", steps),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Swing avg: {:.0}", session.pattern().average_swing()),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
