//! Benchmarks for the kernel's delay-network reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use swinglab::dsp::reverb::{self, DelayNetwork};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0) // Initial impulse
                } else {
                    (i as f32 * 0.05).sin() * 0.1 // Quiet tail
                }
            })
            .collect();

        let mut network = DelayNetwork::new(sample_rate);
        group.bench_with_input(BenchmarkId::new("network_process", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += network.process(black_box(sample));
                }
                sum
            })
        });
    }

    // Whole-sample reverb as the kernel applies it (fresh network each call)
    let one_second: Vec<f32> = (0..48_000).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
    let mut buffer = one_second.clone();
    group.bench_function("apply_1s", |b| {
        b.iter(|| {
            buffer.copy_from_slice(&one_second);
            reverb::apply_reverb(black_box(&mut buffer), sample_rate, reverb::REVERB_WET_MIX);
        })
    });

    group.finish();
}
