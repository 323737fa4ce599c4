//! Benchmarks for the feed-forward compressor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use swinglab::dsp::compressor::{Compressor, CompressorSettings};

use crate::BLOCK_SIZES;

pub fn bench_compressor(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/compressor");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Loud decaying hits, so the detector spends time above threshold
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.3).sin() * (-(i as f32) / size as f32).exp())
            .collect();

        for amount in [20.0f32, 80.0] {
            let mut compressor = Compressor::new(CompressorSettings::from_amount(amount), sample_rate);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("amount_{}", amount as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        compressor.process_buffer(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
