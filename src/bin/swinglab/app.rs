//! Event loop: scheduler wake-ups, key handling and redraws on one thread.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use swinglab::{engine::OutputDevice, Session, TrackId};

use crate::ui;

/// Redraw at ~60 fps when nothing else is due sooner.
const FRAME: Duration = Duration::from_millis(16);

const SWING_STEP: f32 = 5.0;
const BPM_STEP: f64 = 2.0;
const VELOCITY_STEP: f32 = 5.0;
const AMOUNT_STEP: f32 = 5.0;
const GAIN_STEP: f32 = 0.05;
/// Cutoff moves in musical steps: one key press is a third of an octave.
const CUTOFF_RATIO: f32 = 1.26;

/// Grid cursor
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    pub track: usize,
    pub step: usize,
}

impl Cursor {
    pub fn track_id(&self) -> TrackId {
        TrackId::from_index(self.track).unwrap_or(TrackId::Kick)
    }
}

pub struct App {
    session: Session,
    // Held for its stream; dropping it silences playback
    _device: Option<OutputDevice>,
    cursor: Cursor,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session, device: Option<OutputDevice>) -> Self {
        Self {
            session,
            _device: device,
            cursor: Cursor::default(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.session.poll(Instant::now());

            terminal.draw(|frame| ui::render(frame, &self.session, self.cursor))?;

            // Sleep until the next wake-up or frame, whichever is first
            let timeout = self
                .session
                .next_wake()
                .map_or(FRAME, |wake| wake.saturating_duration_since(Instant::now()).min(FRAME));

            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.session.stop();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let track = self.cursor.track_id();
        let steps = self.session.pattern().step_count().steps();
        let params = *self.session.params();

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,

            // Grid
            KeyCode::Left => self.cursor.step = (self.cursor.step + steps - 1) % steps,
            KeyCode::Right => self.cursor.step = (self.cursor.step + 1) % steps,
            KeyCode::Up => self.cursor.track = self.cursor.track.saturating_sub(1),
            KeyCode::Down => self.cursor.track = (self.cursor.track + 1).min(TrackId::ALL.len() - 1),
            KeyCode::Enter | KeyCode::Char('x') => {
                self.session.toggle_step(track, self.cursor.step);
            }
            KeyCode::Char('r') => self.session.randomize(track),
            KeyCode::Char('[') => {
                let swing = self.session.pattern().track(track).swing();
                self.session.set_swing(track, swing - SWING_STEP);
            }
            KeyCode::Char(']') => {
                let swing = self.session.pattern().track(track).swing();
                self.session.set_swing(track, swing + SWING_STEP);
            }
            KeyCode::Char('n') => {
                self.session.toggle_step_count();
                let steps = self.session.pattern().step_count().steps();
                self.cursor.step = self.cursor.step.min(steps - 1);
            }

            // Transport
            KeyCode::Char(' ') => {
                self.session.toggle_transport(Instant::now());
            }
            KeyCode::Char('-') => self.session.set_tempo(self.session.bpm() - BPM_STEP),
            KeyCode::Char('=') | KeyCode::Char('+') => self.session.set_tempo(self.session.bpm() + BPM_STEP),

            // Effects
            KeyCode::Char('v') => self.session.set_velocity(params.velocity() - VELOCITY_STEP),
            KeyCode::Char('V') => self.session.set_velocity(params.velocity() + VELOCITY_STEP),
            KeyCode::Char('c') => self.session.set_cutoff(params.cutoff_hz() / CUTOFF_RATIO),
            KeyCode::Char('C') => self.session.set_cutoff(params.cutoff_hz() * CUTOFF_RATIO),
            KeyCode::Char('d') => self.session.set_distortion_enabled(!params.distortion_enabled()),
            KeyCode::Char(',') => {
                self.session.set_distortion_amount(params.distortion_amount() - AMOUNT_STEP)
            }
            KeyCode::Char('.') => {
                self.session.set_distortion_amount(params.distortion_amount() + AMOUNT_STEP)
            }
            KeyCode::Char('k') => self.session.set_compression_enabled(!params.compression_enabled()),
            KeyCode::Char(';') => {
                self.session.set_compression_amount(params.compression_amount() - AMOUNT_STEP)
            }
            KeyCode::Char('\'') => {
                self.session.set_compression_amount(params.compression_amount() + AMOUNT_STEP)
            }
            KeyCode::Char('e') => self.session.set_reverb_enabled(!params.reverb_enabled()),
            KeyCode::Char('g') => self.session.set_master_gain(params.master_gain() - GAIN_STEP),
            KeyCode::Char('G') => self.session.set_master_gain(params.master_gain() + GAIN_STEP),

            KeyCode::Char('z') => {
                self.session.dismiss_error();
            }
            _ => {}
        }
    }
}
