//! Benchmarks for the audio-thread renderer with a busy pattern.
//!
//! Hits land every sixteenth note at 120 BPM on all three tracks, so voices
//! overlap the way they do during playback.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use swinglab::{
    engine::{connect, OutputClock},
    samples::{synthesize, SYNTH_SAMPLE_RATE},
    voice::{ScheduledEvent, VoiceSink},
    EffectParameters, TrackId,
};

use crate::BLOCK_SIZES;

const SIXTEENTH_AT_120: f64 = 0.125;

pub fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/renderer");

    let kit: Vec<_> = TrackId::ALL
        .iter()
        .map(|&track| (track, Arc::new(synthesize(track, SYNTH_SAMPLE_RATE))))
        .collect();

    let mut params = EffectParameters::default();
    params.set_cutoff_hz(4_000.0);
    params.set_distortion_enabled(true);
    params.set_distortion_amount(30.0);
    params.set_compression_enabled(true);
    params.set_compression_amount(50.0);

    for &size in BLOCK_SIZES {
        let (mut renderer, mut handle) = connect(48_000.0, &params);
        let mut out = vec![0.0f32; size * 2];
        let mut next_hit = 0.0f64;

        group.bench_with_input(BenchmarkId::new("3_track_stereo", size), &size, |b, _| {
            b.iter(|| {
                let now = handle.clock.now();
                if now >= next_hit {
                    for (track, buffer) in &kit {
                        handle.sender.dispatch(ScheduledEvent {
                            track: *track,
                            time: now,
                            gain: 0.8,
                            buffer: Arc::clone(buffer),
                        });
                    }
                    next_hit += SIXTEENTH_AT_120;
                }
                renderer.render(black_box(&mut out), 2);
            })
        });
    }

    group.finish();
}
