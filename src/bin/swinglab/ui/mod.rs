//! TUI rendering for swinglab
//!
//! Pure functions of the session state; nothing here mutates it.

mod effects;
mod grid;
mod transport;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use swinglab::Session;

use crate::app::Cursor;

use effects::render_effects;
use grid::render_grid;
use transport::render_transport;

pub fn render(frame: &mut Frame, session: &Session, cursor: Cursor) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(7),    // Step grid
            Constraint::Length(3), // Effects
            Constraint::Length(1), // Error banner
            Constraint::Length(2), // Help
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], session);

    let grid_block = Block::default().title(" Pattern ").borders(Borders::ALL);
    let grid_inner = grid_block.inner(chunks[1]);
    frame.render_widget(grid_block, chunks[1]);
    render_grid(frame, grid_inner, session, cursor);

    render_effects(frame, chunks[2], session.params());

    if let Some(err) = session.error() {
        let hint = if err.blocks_start() { "" } else { "  [Z] dismiss" };
        let banner = Paragraph::new(format!(" ! {err}{hint}"))
            .style(Style::default().fg(Color::White).bg(Color::Red));
        frame.render_widget(banner, chunks[3]);
    }

    let help = Paragraph::new(
        " [Space] Play/Stop  [Arrows] Move  [Enter/X] Toggle  [R] Random  [ [ ] ] Swing  [N] 8/16  [-/=] BPM  [Q] Quit\n \
         [v/V] Velocity  [c/C] Cutoff  [D] Dist  [,/.] Dist amt  [K] Comp  [;/'] Comp amt  [E] Reverb  [g/G] Gain",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
