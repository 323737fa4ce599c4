//! Low-level DSP primitives used by the signal chain and the reference kernel.
//!
//! The filter, waveshaper and compressor are allocation-free once constructed
//! and are safe to run inside the audio callback. The reverb and spectral
//! low-pass allocate per call and only ever run on the control thread, inside
//! the DSP kernel.

/// Feed-forward dynamics compressor with a soft knee.
pub mod compressor;
/// Waveshaping transfer curves.
pub mod distortion;
/// State-variable low-pass filter.
pub mod filter;
/// Damped feedback delay network used by the kernel's reverb.
pub mod reverb;
/// FFT-based brick-wall style low-pass.
pub mod spectral;
