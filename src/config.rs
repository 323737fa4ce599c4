//! Session configuration.
//!
//! Built with chained setters, each of which clamps to the same range the
//! live setters use:
//!
//! ```
//! use swinglab::{SessionConfig, StepCount};
//!
//! let config = SessionConfig::new()
//!     .bpm(96.0)
//!     .velocity(80.0)
//!     .step_count(StepCount::Eight);
//! assert_eq!(config.initial_bpm(), 96.0);
//! ```

use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    params::EffectParameters,
    pattern::{StepCount, TrackId, TRACK_COUNT},
    scheduler::{DEFAULT_BPM, MAX_BPM, MIN_BPM},
};

/// Environment variable that overrides the initial tempo.
pub const BPM_ENV: &str = "SWINGLAB_BPM";

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    bpm: f64,
    step_count: StepCount,
    effects: EffectParameters,
    sample_paths: [Option<PathBuf>; TRACK_COUNT],
    fallback_kit: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            step_count: StepCount::Sixteen,
            effects: EffectParameters::default(),
            sample_paths: [None, None, None],
            fallback_kit: true,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `<dir>/kick.wav`, `<dir>/snare.wav` and `<dir>/hihat.wav` for any
    /// of those files that exist. Tracks without a file use the fallback kit.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut config = Self::new();
        for track in TrackId::ALL {
            let path = dir.join(format!("{}.wav", track.name()));
            if path.is_file() {
                config.sample_paths[track.index()] = Some(path);
            }
        }
        config
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        if !bpm.is_nan() {
            self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        }
        self
    }

    pub fn step_count(mut self, step_count: StepCount) -> Self {
        self.step_count = step_count;
        self
    }

    pub fn velocity(mut self, velocity: f32) -> Self {
        self.effects.set_velocity(velocity);
        self
    }

    pub fn master_gain(mut self, gain: f32) -> Self {
        self.effects.set_master_gain(gain);
        self
    }

    pub fn cutoff_hz(mut self, hz: f32) -> Self {
        self.effects.set_cutoff_hz(hz);
        self
    }

    pub fn with_sample(mut self, track: TrackId, path: impl Into<PathBuf>) -> Self {
        self.sample_paths[track.index()] = Some(path.into());
        self
    }

    /// Synthesize a sound for tracks with no configured file.
    pub fn fallback_kit(mut self, enabled: bool) -> Self {
        self.fallback_kit = enabled;
        self
    }

    /// Apply `SWINGLAB_BPM` if it is set.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_bpm_override(std::env::var(BPM_ENV).ok().as_deref())
    }

    fn apply_bpm_override(self, value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(self),
            Some(raw) => {
                let bpm: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("{BPM_ENV}={raw:?} is not a number")))?;
                if !bpm.is_finite() {
                    return Err(Error::Config(format!("{BPM_ENV}={raw:?} is not finite")));
                }
                Ok(self.bpm(bpm))
            }
        }
    }

    pub fn initial_bpm(&self) -> f64 {
        self.bpm
    }

    pub fn initial_step_count(&self) -> StepCount {
        self.step_count
    }

    pub fn effect_parameters(&self) -> EffectParameters {
        self.effects
    }

    pub fn sample_path(&self, track: TrackId) -> Option<&Path> {
        self.sample_paths[track.index()].as_deref()
    }

    pub fn synthesize_missing(&self) -> bool {
        self.fallback_kit
    }
}
