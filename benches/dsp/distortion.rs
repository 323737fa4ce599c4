//! Benchmarks for curve-table waveshaping.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use swinglab::dsp::distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    // Regenerating the table is what a distortion-amount change costs
    let mut curve = distortion::make_curve(50.0);
    group.bench_function("fill_curve", |b| {
        b.iter(|| distortion::fill_curve(black_box(&mut curve), black_box(75.0)))
    });

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for amount in [10.0f32, 50.0, 100.0] {
            let curve = distortion::make_curve(amount);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("shape_{}", amount as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        distortion::shape_buffer(black_box(&curve), black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
