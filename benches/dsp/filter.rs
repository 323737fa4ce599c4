//! Benchmarks for the state-variable low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use swinglab::dsp::filter::SVFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fully open, the default chain setting
        let mut filter = SVFilter::lowpass(20_000.0, 1.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_open", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(sample_rate));
            })
        });

        let mut filter = SVFilter::lowpass(800.0, 1.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_800hz", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(sample_rate));
            })
        });

        // Cutoff moving every block, as when the user sweeps it
        let mut filter = SVFilter::lowpass(800.0, 1.0);
        let mut buffer = input.clone();
        let mut cutoff = 200.0f32;
        group.bench_with_input(BenchmarkId::new("lowpass_sweep", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 18_000.0 { 200.0 } else { cutoff * 1.05 };
                filter.set_cutoff(cutoff);
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(sample_rate));
            })
        });
    }

    group.finish();
}
