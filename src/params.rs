//! Effect parameters and the lock-free cells that carry them to the audio thread.
//!
//! [`EffectParameters`] is plain data owned by the control thread. Every
//! setter clamps to the documented range and ignores NaN, so a value read back
//! is always usable as-is. The live chain never sees this struct directly: it
//! reads [`AtomicF32`]/`AtomicBool` cells that the session writes after each
//! change.

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::kernel::KernelParams;

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const MAX_AMOUNT: f32 = 100.0;
pub const MAX_MASTER_GAIN: f32 = 2.0;
pub const MAX_VELOCITY: f32 = 100.0;

/// An `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

#[inline]
fn clamped(value: f32, min: f32, max: f32) -> Option<f32> {
    (!value.is_nan()).then(|| value.clamp(min, max))
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    cutoff_hz: f32,
    distortion_amount: f32,
    distortion_enabled: bool,
    compression_amount: f32,
    compression_enabled: bool,
    reverb_enabled: bool,
    master_gain: f32,
    velocity: f32,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            cutoff_hz: MAX_CUTOFF_HZ,
            distortion_amount: 0.0,
            distortion_enabled: false,
            compression_amount: 0.0,
            compression_enabled: false,
            reverb_enabled: false,
            master_gain: 0.8,
            velocity: MAX_VELOCITY,
        }
    }
}

impl EffectParameters {
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_cutoff_hz(&mut self, hz: f32) {
        if let Some(hz) = clamped(hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ) {
            self.cutoff_hz = hz;
        }
    }

    pub fn distortion_amount(&self) -> f32 {
        self.distortion_amount
    }

    pub fn set_distortion_amount(&mut self, amount: f32) {
        if let Some(amount) = clamped(amount, 0.0, MAX_AMOUNT) {
            self.distortion_amount = amount;
        }
    }

    pub fn distortion_enabled(&self) -> bool {
        self.distortion_enabled
    }

    pub fn set_distortion_enabled(&mut self, enabled: bool) {
        self.distortion_enabled = enabled;
    }

    pub fn compression_amount(&self) -> f32 {
        self.compression_amount
    }

    pub fn set_compression_amount(&mut self, amount: f32) {
        if let Some(amount) = clamped(amount, 0.0, MAX_AMOUNT) {
            self.compression_amount = amount;
        }
    }

    pub fn compression_enabled(&self) -> bool {
        self.compression_enabled
    }

    pub fn set_compression_enabled(&mut self, enabled: bool) {
        self.compression_enabled = enabled;
    }

    pub fn reverb_enabled(&self) -> bool {
        self.reverb_enabled
    }

    pub fn set_reverb_enabled(&mut self, enabled: bool) {
        self.reverb_enabled = enabled;
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        if let Some(gain) = clamped(gain, 0.0, MAX_MASTER_GAIN) {
            self.master_gain = gain;
        }
    }

    /// Velocity scale in percent.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        if let Some(velocity) = clamped(velocity, 0.0, MAX_VELOCITY) {
            self.velocity = velocity;
        }
    }

    /// The subset of parameters the DSP kernel sees.
    pub fn kernel_params(&self) -> KernelParams {
        KernelParams {
            master_gain: self.master_gain,
            reverb_enabled: self.reverb_enabled,
            cutoff_hz: self.cutoff_hz,
        }
    }
}
