//! Spectral low-pass
//!
//! Filters a whole buffer in the frequency domain: transform, zero everything
//! above the cutoff, transform back. Unlike the chain's state-variable filter
//! this is not causal and cannot run block by block, but on a short one-shot
//! drum sample it gives a very steep cut with no phase shift.
//!
//! The buffer is zero-padded to the next power of two. Bins past the cutoff
//! bin fade out over `ROLLOFF_BINS` with a (1 - t)^4 curve rather than
//! stopping dead, which keeps ringing down. Each bin is paired with its mirror
//! (n - i) so the spectrum stays conjugate-symmetric and the result is real.

use rustfft::{num_complex::Complex, FftPlanner};

/// Width of the transition band in bins.
const ROLLOFF_BINS: usize = 5;

/// Attenuation for a bin `distance` bins past the cutoff.
#[inline]
fn rolloff(distance: usize) -> f32 {
    if distance >= ROLLOFF_BINS {
        0.0
    } else {
        let t = distance as f32 / ROLLOFF_BINS as f32;
        (1.0 - t).powi(4)
    }
}

/// Low-pass `buffer` in place at `cutoff_hz`.
///
/// A cutoff at or above Nyquist leaves the buffer untouched.
pub fn lowpass(planner: &mut FftPlanner<f32>, buffer: &mut [f32], sample_rate: f32, cutoff_hz: f32) {
    if buffer.is_empty() || cutoff_hz >= sample_rate / 2.0 {
        return;
    }

    let size = buffer.len().next_power_of_two();
    let forward = planner.plan_fft_forward(size);
    let inverse = planner.plan_fft_inverse(size);

    let mut spectrum: Vec<Complex<f32>> = buffer
        .iter()
        .map(|&re| Complex { re, im: 0.0 })
        .chain(std::iter::repeat(Complex { re: 0.0, im: 0.0 }))
        .take(size)
        .collect();

    forward.process(&mut spectrum);

    let resolution = sample_rate / size as f32;
    let cutoff_bin = (cutoff_hz.max(0.0) / resolution) as usize;

    for (i, bin) in spectrum.iter_mut().enumerate() {
        // Bin i and bin size - i carry the same frequency
        let freq_bin = i.min(size - i);
        if freq_bin > cutoff_bin {
            *bin *= rolloff(freq_bin - cutoff_bin);
        }
    }

    inverse.process(&mut spectrum);

    let scale = 1.0 / size as f32;
    for (out, bin) in buffer.iter_mut().zip(spectrum.iter()) {
        *out = bin.re * scale;
    }
}
