//! Humanization: per-step accents and swing displacement.
//!
//! Two different swing values feed the model. A track's *own* swing shapes
//! the accent of its odd steps, while the *average* swing of all tracks moves
//! steps in time. Every track therefore lands its hits at the same moment,
//! but each can accent them differently.
//!
//! The offset of an odd step is added to the gap that follows it, so it is
//! carried into every later step:
//!
//! ```text
//! step            0     1      2     3      4  ...
//! accent        1.0  0.7..0.9 0.85 0.7..0.9 1.0
//! gap after      I    I + o     I   I + o    I
//! ```

/// Accent multiplier for `step` given the track's own swing (0 to 100).
#[inline]
pub fn velocity_multiplier(step: usize, track_swing: f32) -> f32 {
    if step % 4 == 0 {
        1.0
    } else if step % 2 == 0 {
        0.85
    } else {
        0.7 + (track_swing / 100.0) * 0.2
    }
}

/// Swing offset in seconds contributed by `step`.
///
/// Zero for even steps. An odd step stretches the gap after it by up to half
/// a step: longer when `avg_swing` is above 50, shorter when below.
#[inline]
pub fn timing_offset(step: usize, avg_swing: f32, seconds_per_beat: f64, steps_per_beat: u32) -> f64 {
    if step % 2 == 0 {
        return 0.0;
    }
    seconds_per_beat * (avg_swing as f64 / 100.0 - 0.5) / steps_per_beat as f64
}

/// Final voice gain from the velocity scale (percent) and the step's accent.
#[inline]
pub fn voice_gain(velocity: f32, multiplier: f32) -> f32 {
    (velocity / 100.0) * multiplier
}

#[inline]
pub fn seconds_per_beat(bpm: f64) -> f64 {
    60.0 / bpm
}

/// Grid spacing between consecutive steps.
#[inline]
pub fn step_interval(bpm: f64, steps_per_beat: u32) -> f64 {
    seconds_per_beat(bpm) / steps_per_beat as f64
}
