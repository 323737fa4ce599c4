//! Benchmarks for the master effect chain in its common configurations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use swinglab::{graph::SignalChain, EffectParameters};

use crate::BLOCK_SIZES;

fn configs() -> Vec<(&'static str, EffectParameters)> {
    let dry = EffectParameters::default();

    let mut filtered = dry;
    filtered.set_cutoff_hz(1_200.0);

    let mut driven = filtered;
    driven.set_distortion_enabled(true);
    driven.set_distortion_amount(60.0);

    let mut full = driven;
    full.set_compression_enabled(true);
    full.set_compression_amount(70.0);

    vec![
        ("dry", dry),
        ("filtered", filtered),
        ("distorted", driven),
        ("full", full),
    ]
}

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.07).sin() * 0.8).collect();

        for (name, params) in configs() {
            let (mut chain, _handle) = SignalChain::new(48_000.0, &params);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    chain.process(black_box(&mut buffer));
                })
            });
        }

        // Parameter writes landing between every block
        let (mut chain, mut handle) = SignalChain::new(48_000.0, &EffectParameters::default());
        let mut params = EffectParameters::default();
        params.set_distortion_enabled(true);
        let mut buffer = input.clone();
        let mut amount = 0.0f32;
        group.bench_with_input(BenchmarkId::new("automated", size), &size, |b, _| {
            b.iter(|| {
                amount = (amount + 1.0) % 100.0;
                params.set_distortion_amount(amount);
                handle.apply(&params);
                buffer.copy_from_slice(&input);
                chain.process(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
