//! Dynamics compression
//!
//! A compressor turns loud passages down. It follows the level of the input
//! in decibels and, once that level crosses the threshold, reduces gain so the
//! output only rises by `1 / ratio` dB for every dB the input rises.
//!
//! # Gain Computer (soft knee)
//!
//! With level L, threshold T, ratio R and knee width W (all in dB):
//!
//! ```text
//! 2(L - T) < -W          →  L                               (below knee)
//! 2|L - T| <= W          →  L + (1/R - 1)(L - T + W/2)² / 2W  (inside knee)
//! 2(L - T) > W           →  T + (L - T) / R                 (above knee)
//! ```
//!
//! The difference between the computed level and L is the gain reduction.
//!
//! # Ballistics
//!
//! Gain reduction is smoothed by a one-pole follower: it moves towards more
//! reduction with the attack time constant and recovers with the release time
//! constant.
//!
//! # Drum Bus Mapping
//!
//! The chain drives the compressor from a single `amount` (0 to 100):
//!   threshold = -50 + amount * 0.5 dB
//!   ratio     = 1 + amount * 0.1
//! with a fixed 40 dB knee, 3 ms attack and 250 ms release. `amount = 0`
//! gives ratio 1, which never reduces gain.

/// Fixed knee width in dB.
pub const KNEE_DB: f32 = 40.0;
/// Fixed attack time in seconds.
pub const ATTACK_SECONDS: f32 = 0.003;
/// Fixed release time in seconds.
pub const RELEASE_SECONDS: f32 = 0.25;

/// Levels below this are treated as silence by the detector.
const SILENCE_DB: f32 = -120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    pub ratio: f32,
    pub knee_db: f32,
    pub attack: f32,
    pub release: f32,
}

impl CompressorSettings {
    /// Settings for a compression amount between 0 and 100.
    pub fn from_amount(amount: f32) -> Self {
        let amount = amount.clamp(0.0, 100.0);
        Self {
            threshold_db: -50.0 + amount * 0.5,
            ratio: 1.0 + amount * 0.1,
            knee_db: KNEE_DB,
            attack: ATTACK_SECONDS,
            release: RELEASE_SECONDS,
        }
    }

    /// Static curve: the output level (dB) for an input level (dB).
    pub fn compute_level(&self, level_db: f32) -> f32 {
        let over = level_db - self.threshold_db;
        let knee = self.knee_db;

        if 2.0 * over < -knee {
            level_db
        } else if knee > 0.0 && 2.0 * over.abs() <= knee {
            let x = over + knee / 2.0;
            level_db + (1.0 / self.ratio - 1.0) * x * x / (2.0 * knee)
        } else {
            self.threshold_db + over / self.ratio
        }
    }
}

#[inline]
fn time_coeff(seconds: f32, sample_rate: f32) -> f32 {
    (-1.0 / (seconds * sample_rate)).exp()
}

#[inline]
fn lin_to_db(x: f32) -> f32 {
    if x <= 1e-6 {
        SILENCE_DB
    } else {
        20.0 * x.log10()
    }
}

#[inline]
fn db_to_lin(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

pub struct Compressor {
    settings: CompressorSettings,
    attack_coeff: f32,
    release_coeff: f32,
    reduction_db: f32,
}

impl Compressor {
    pub fn new(settings: CompressorSettings, sample_rate: f32) -> Self {
        Self {
            settings,
            attack_coeff: time_coeff(settings.attack, sample_rate),
            release_coeff: time_coeff(settings.release, sample_rate),
            reduction_db: 0.0,
        }
    }

    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    /// Swap threshold and ratio in place; the follower state carries over.
    pub fn set_settings(&mut self, settings: CompressorSettings) {
        self.settings = settings;
    }

    /// Current smoothed gain reduction in dB (zero or negative).
    pub fn reduction_db(&self) -> f32 {
        self.reduction_db
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level = lin_to_db(input.abs());
        let target = (self.settings.compute_level(level) - level).min(0.0);

        let coeff = if target < self.reduction_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.reduction_db = coeff * self.reduction_db + (1.0 - coeff) * target;

        input * db_to_lin(self.reduction_db)
    }

    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.reduction_db = 0.0;
    }
}
