//! Distortion / Waveshaping
//!
//! A waveshaper maps every input sample through a transfer curve:
//!   output = curve(input)
//!
//! The curve is precomputed into a lookup table and read with linear
//! interpolation, so reshaping costs one table read per sample no matter how
//! expensive the curve is to evaluate.
//!
//! # The Drum Bus Curve
//!
//!   curve(x) = (3 + amount) * x * 20 * deg / (pi + amount * |x|)
//!   deg      = pi / 180
//!
//! At `amount = 0` this is a straight line with slope `3 * 20 * deg / pi`
//! (about 0.33), a quiet linear copy of the input. As `amount` grows the
//! denominator bends the line into a soft saturation that pushes quiet
//! samples up towards the peaks.
//!
//! # Table Layout
//!
//! The table holds `CURVE_RESOLUTION` points for x in [-1, 1):
//!
//!   x_i = 2 * i / n - 1
//!
//! Reading maps an input v in [-1, 1] onto the fractional index
//! `(n - 1) * (v + 1) / 2`; inputs outside that range clamp to the end points.

use std::f32::consts::PI;

/// Points in the transfer table (one second of audio at 44.1 kHz).
pub const CURVE_RESOLUTION: usize = 44_100;

/// Evaluate the transfer curve at `x` for the given amount (0 to 100).
#[inline]
pub fn curve_point(x: f32, amount: f32) -> f32 {
    let deg = PI / 180.0;
    (3.0 + amount) * x * 20.0 * deg / (PI + amount * x.abs())
}

/// Fill a table in place with the curve for `amount`.
pub fn fill_curve(curve: &mut [f32], amount: f32) {
    let n = curve.len() as f32;
    for (i, point) in curve.iter_mut().enumerate() {
        let x = (i as f32 * 2.0) / n - 1.0;
        *point = curve_point(x, amount);
    }
}

/// Build a freshly allocated table for `amount`.
pub fn make_curve(amount: f32) -> Vec<f32> {
    let mut curve = vec![0.0; CURVE_RESOLUTION];
    fill_curve(&mut curve, amount);
    curve
}

/// Read the table at `sample` with linear interpolation.
#[inline]
pub fn shape(curve: &[f32], sample: f32) -> f32 {
    let last = match curve.len() {
        0 => return sample,
        1 => return curve[0],
        n => n - 1,
    };

    let pos = (last as f32 * (sample.clamp(-1.0, 1.0) + 1.0) * 0.5).max(0.0);
    let i = (pos as usize).min(last);
    if i == last {
        return curve[last];
    }
    let frac = pos - i as f32;
    curve[i] * (1.0 - frac) + curve[i + 1] * frac
}

/// Shape a whole buffer in place.
pub fn shape_buffer(curve: &[f32], buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = shape(curve, *sample);
    }
}
