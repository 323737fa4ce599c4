//! Reverb - a damped feedback delay network
//!
//! Eight delay lines run in parallel. Each one feeds its own output back into
//! itself through a one-pole low-pass, so every echo comes back a little
//! darker than the last. Summing the lines gives a dense, decaying tail.
//!
//! ```text
//!          ┌──→ [line 1] ──┐  early reflections (heavily damped, weight 0.3)
//!          ├──→   ...    ──┤
//! Input ───┼──→ [line 4] ──┼──→ (+) ──→ Output
//!          ├──→ [line 5] ──┤  main tail (lightly damped, weight 0.7)
//!          └──→ [line 8] ──┘
//! ```
//!
//! ## Damped Delay Line
//!
//! ```text
//! d[n]     = buffer[pos]
//! s[n]     = s[n-1] * damping + d[n] * (1 - damping)
//! buffer   ← x[n] + s[n] * feedback
//! ```
//!
//! Delay lengths are mutually prime ratios of one second so the echoes never
//! line up into a pitched resonance.

/// Delay lengths in seconds.
const DELAY_SECONDS: [f32; LINE_COUNT] = [
    0.0297, 0.0371, 0.0411, 0.0437, // early reflections
    0.0531, 0.0673, 0.0797, 0.0971, // main tail
];

const LINE_COUNT: usize = 8;
const EARLY_LINES: usize = 4;

const FEEDBACK: f32 = 0.7;
const EARLY_DAMPING: f32 = 0.3;
const LATE_DAMPING: f32 = 0.8;
const EARLY_WEIGHT: f32 = 0.3;
const LATE_WEIGHT: f32 = 0.7;

/// Dry/wet balance the kernel uses when reverb is enabled.
pub const REVERB_WET_MIX: f32 = 0.25;

/// A single delay line with damped feedback
pub struct DampedDelayLine {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    damping: f32,
    filter_state: f32,
}

impl DampedDelayLine {
    pub fn new(delay_samples: usize, feedback: f32, damping: f32) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
            feedback: feedback.clamp(0.0, 0.99),
            damping: damping.clamp(0.0, 1.0),
            filter_state: 0.0,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.pos];

        // One-pole lowpass on the way back in
        self.filter_state = self.filter_state * self.damping + delayed * (1.0 - self.damping);

        self.buffer[self.pos] = input + self.filter_state * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();

        self.filter_state
    }
}

/// Eight damped lines summed with early/late weighting
pub struct DelayNetwork {
    lines: Vec<DampedDelayLine>,
}

impl DelayNetwork {
    pub fn new(sample_rate: f32) -> Self {
        let lines = DELAY_SECONDS
            .iter()
            .enumerate()
            .map(|(i, &seconds)| {
                let damping = if i < EARLY_LINES { EARLY_DAMPING } else { LATE_DAMPING };
                DampedDelayLine::new((seconds * sample_rate) as usize, FEEDBACK, damping)
            })
            .collect();

        Self { lines }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        self.lines
            .iter_mut()
            .enumerate()
            .map(|(i, line)| {
                let weight = if i < EARLY_LINES { EARLY_WEIGHT } else { LATE_WEIGHT };
                line.process(input) * weight
            })
            .sum()
    }
}

/// Run a fresh network over `buffer` and blend it in at `wet`.
///
/// The tail is truncated at the end of the buffer; output length always
/// equals input length.
pub fn apply_reverb(buffer: &mut [f32], sample_rate: f32, wet: f32) {
    let wet = wet.clamp(0.0, 1.0);
    let mut network = DelayNetwork::new(sample_rate);
    for sample in buffer.iter_mut() {
        let tail = network.process(*sample);
        *sample = *sample * (1.0 - wet) + tail * wet;
    }
}
