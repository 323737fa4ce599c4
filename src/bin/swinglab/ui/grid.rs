//! Step grid widget - one row per track with playhead and cursor

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use swinglab::Session;

use crate::app::Cursor;

const LABEL_WIDTH: usize = 16;

pub fn render_grid(frame: &mut Frame, area: Rect, session: &Session, cursor: Cursor) {
    if area.height < 2 || area.width < 20 {
        return;
    }

    let pattern = session.pattern();
    let steps = pattern.step_count().steps();
    let playhead = session.current_step();

    let mut lines = Vec::new();

    // Step numbers, one column group per beat
    let mut header = " ".repeat(LABEL_WIDTH);
    for step in 0..steps {
        header.push_str(&format!("{:<3}", step + 1));
    }
    lines.push(Line::from(Span::styled(header, Style::default().fg(Color::DarkGray))));

    for (row, track) in pattern.tracks().iter().enumerate() {
        let selected = row == cursor.track;
        let mut spans = vec![Span::styled(
            format!("{:<6} swing {:>3.0} ", track.id().name(), track.swing()),
            Style::default().fg(if selected { Color::White } else { Color::Gray }),
        )];

        for (step, &active) in track.steps().iter().enumerate() {
            let mut style = Style::default().fg(if active { Color::Cyan } else { Color::DarkGray });
            if step % 4 == 0 && !active {
                style = style.fg(Color::Gray);
            }
            if playhead == Some(step) {
                style = style.bg(Color::Yellow).fg(Color::Black);
            }
            if selected && cursor.step == step {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(if active { " ● " } else { " · " }, style));
        }

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
