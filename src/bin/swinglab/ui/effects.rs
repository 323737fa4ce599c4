use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use swinglab::EffectParameters;

fn toggle(label: &str, enabled: bool, detail: Option<String>) -> Span<'static> {
    let text = match detail {
        Some(detail) => format!("{label} {} {detail}  ", if enabled { "on " } else { "off" }),
        None => format!("{label} {}  ", if enabled { "on " } else { "off" }),
    };
    Span::styled(
        text,
        Style::default().fg(if enabled { Color::Green } else { Color::DarkGray }),
    )
}

pub fn render_effects(frame: &mut Frame, area: Rect, params: &EffectParameters) {
    let block = Block::default().title(" Effects ").borders(Borders::ALL);

    let line = Line::from(vec![
        Span::styled(
            format!(" Vel {:>3.0}%  ", params.velocity()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Cutoff {:>5.0} Hz  ", params.cutoff_hz()),
            Style::default().fg(Color::Cyan),
        ),
        toggle(
            "Dist",
            params.distortion_enabled(),
            Some(format!("{:.0}", params.distortion_amount())),
        ),
        toggle(
            "Comp",
            params.compression_enabled(),
            Some(format!("{:.0}", params.compression_amount())),
        ),
        toggle("Reverb", params.reverb_enabled(), None),
        Span::styled(
            format!("Gain {:.2}", params.master_gain()),
            Style::default().fg(Color::White),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
