use std::f32::consts::PI;

/*
State-Variable Low-Pass
=======================

The chain's filter is a two-pole low-pass built on the state-variable topology
with a topology-preserving transform (TPT). It behaves like the classic
analog filter: frequencies below the cutoff pass, frequencies above roll off
at 12 dB/octave.

Parameters:
-----------

Cutoff (Hz): where the roll-off begins.
  - 20 Hz:     almost closed (very dark)
  - 1000 Hz:   warm, muffled drums
  - 20000 Hz:  fully open

Q: emphasis around the cutoff. The chain always runs at Q = 1, a mild bump
just below the cutoff. The damping term is k = 1 / Q.

| Q    | k    | response                      |
| ---- | ---- | ----------------------------- |
| 0.5  | 2.0  | no peak, slow knee            |
| 0.71 | 1.41 | Butterworth (maximally flat)  |
| 1.0  | 1.0  | slight resonant peak          |
*/

/// Coefficients stay stable up to just below Nyquist.
const MAX_CUTOFF_RATIO: f32 = 0.49;

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: q.max(0.01),
        }
    }

    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        let cutoff = self.cutoff_hz.min(sample_rate * MAX_CUTOFF_RATIO);
        (PI * cutoff / sample_rate).tan()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> f32 {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = self.compute_g(sample_rate);
        let k = 1.0 / self.q;

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }
}
