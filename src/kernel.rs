//! The DSP kernel: turns a raw sample into the buffer a voice will play.
//!
//! The kernel is a pure function of its inputs. The voice trigger calls it
//! once per channel on the control thread before a voice is scheduled, so it
//! may allocate freely. Implement [`DspKernel`] to swap in a different one;
//! any `FnMut(&[f32], f32, &KernelParams) -> Result<Vec<f32>, KernelError>`
//! already qualifies.

use rustfft::FftPlanner;
use thiserror::Error;

use crate::dsp::{reverb, spectral};

/// Per-call kernel parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    pub master_gain: f32,
    pub reverb_enabled: bool,
    pub cutoff_hz: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("input buffer is empty")]
    EmptyInput,
    #[error("non-finite sample at index {index}")]
    NonFinite { index: usize },
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(f32),
    #[error("kernel returned {actual} samples for {expected} input samples")]
    LengthMismatch { expected: usize, actual: usize },
}

pub trait DspKernel: Send {
    /// Process one channel. Output must have the same length as `input`.
    fn process(
        &mut self,
        input: &[f32],
        sample_rate: f32,
        params: &KernelParams,
    ) -> Result<Vec<f32>, KernelError>;
}

impl<F> DspKernel for F
where
    F: FnMut(&[f32], f32, &KernelParams) -> Result<Vec<f32>, KernelError> + Send,
{
    fn process(
        &mut self,
        input: &[f32],
        sample_rate: f32,
        params: &KernelParams,
    ) -> Result<Vec<f32>, KernelError> {
        self(input, sample_rate, params)
    }
}

/// Check the preconditions every kernel shares.
pub fn validate(input: &[f32], sample_rate: f32) -> Result<(), KernelError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(KernelError::InvalidSampleRate(sample_rate));
    }
    if input.is_empty() {
        return Err(KernelError::EmptyInput);
    }
    if let Some(index) = input.iter().position(|s| !s.is_finite()) {
        return Err(KernelError::NonFinite { index });
    }
    Ok(())
}

/// Reference kernel: spectral low-pass, optional reverb, master gain.
pub struct SpectralKernel {
    planner: FftPlanner<f32>,
}

impl SpectralKernel {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }
}

impl Default for SpectralKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl DspKernel for SpectralKernel {
    fn process(
        &mut self,
        input: &[f32],
        sample_rate: f32,
        params: &KernelParams,
    ) -> Result<Vec<f32>, KernelError> {
        validate(input, sample_rate)?;

        let mut output = input.to_vec();
        spectral::lowpass(&mut self.planner, &mut output, sample_rate, params.cutoff_hz);

        if params.reverb_enabled {
            reverb::apply_reverb(&mut output, sample_rate, reverb::REVERB_WET_MIX);
        }

        for sample in output.iter_mut() {
            *sample *= params.master_gain;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(gain: f32, reverb: bool) -> KernelParams {
        KernelParams {
            master_gain: gain,
            reverb_enabled: reverb,
            // Nyquist at 44.1 kHz, so the low-pass is a no-op
            cutoff_hz: 22_050.0,
        }
    }

    #[test]
    fn test_gain_scales_output() {
        let mut kernel = SpectralKernel::new();
        let input = [0.5, 0.3, -0.2, 0.8];

        let output = kernel.process(&input, 44_100.0, &params(0.5, false)).unwrap();

        assert_eq!(output.len(), input.len());
        for (o, i) in output.iter().zip(input.iter()) {
            assert!((o - i * 0.5).abs() < 1e-3, "{o} vs {i}");
        }
    }

    #[test]
    fn test_is_deterministic_with_reverb() {
        let mut kernel = SpectralKernel::new();
        let input: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.01).sin()).collect();

        let a = kernel.process(&input, 44_100.0, &params(1.0, true)).unwrap();
        let b = kernel.process(&input, 44_100.0, &params(1.0, true)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let mut kernel = SpectralKernel::new();

        assert_eq!(
            kernel.process(&[], 44_100.0, &params(1.0, false)),
            Err(KernelError::EmptyInput)
        );
        assert_eq!(
            kernel.process(&[0.0, f32::NAN], 44_100.0, &params(1.0, false)),
            Err(KernelError::NonFinite { index: 1 })
        );
        assert_eq!(
            kernel.process(&[0.0], 0.0, &params(1.0, false)),
            Err(KernelError::InvalidSampleRate(0.0))
        );
    }

    #[test]
    fn test_closures_are_kernels() {
        let mut passthrough = |input: &[f32], _sr: f32, _p: &KernelParams| {
            Ok::<_, KernelError>(input.to_vec())
        };
        let out = passthrough.process(&[1.0, 2.0], 48_000.0, &params(1.0, false)).unwrap();
        assert_eq!(out, vec![1.0, 2.0]);
    }
}
