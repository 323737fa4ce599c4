//! Output clocks.
//!
//! Event times are seconds on the *output* clock: how much audio the device
//! has actually consumed. Wall-clock wake-ups can be late by any amount
//! without moving a single event.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

pub trait OutputClock {
    /// Current output time in seconds.
    fn now(&self) -> f64;
}

/// Frames rendered so far divided by the sample rate.
///
/// The renderer advances it after each block; clones share the counter.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl FrameClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1.0) as f64,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Release);
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Nearest frame for an output time.
    pub fn frame_at(&self, time: f64) -> u64 {
        (time.max(0.0) * self.sample_rate).round() as u64
    }
}

impl OutputClock for FrameClock {
    fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate
    }
}

/// A clock moved by hand, for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    pub fn set(&self, time: f64) {
        self.bits.store(time.to_bits(), Ordering::Release);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl OutputClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl<C: OutputClock + ?Sized> OutputClock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}
