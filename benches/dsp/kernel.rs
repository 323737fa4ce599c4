//! Benchmarks for the spectral sample kernel.
//!
//! Sizes are whole drum samples rather than device blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use swinglab::{
    kernel::{DspKernel, KernelParams, SpectralKernel},
    samples::{synthesize, SYNTH_SAMPLE_RATE},
    TrackId,
};

pub fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/kernel");
    group.sample_size(20);

    let sample_rate = SYNTH_SAMPLE_RATE as f32;
    let dry = KernelParams {
        master_gain: 0.8,
        reverb_enabled: false,
        cutoff_hz: 20_000.0,
    };
    let wet = KernelParams {
        reverb_enabled: true,
        cutoff_hz: 2_000.0,
        ..dry
    };

    for track in TrackId::ALL {
        let sample = synthesize(track, SYNTH_SAMPLE_RATE);
        let input = &sample.channels[0];
        let mut kernel = SpectralKernel::new();

        group.bench_with_input(BenchmarkId::new("dry", track.name()), input, |b, input| {
            b.iter(|| kernel.process(black_box(input), sample_rate, black_box(&dry)))
        });

        group.bench_with_input(BenchmarkId::new("reverb", track.name()), input, |b, input| {
            b.iter(|| kernel.process(black_box(input), sample_rate, black_box(&wet)))
        });
    }

    group.finish();
}
