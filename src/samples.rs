//! Sample supply: decoded per-track PCM buffers.
//!
//! Buffers are kept planar at their file's own rate; resampling and downmix
//! happen when a voice plays them. A track whose file fails to load is left
//! empty and the failure is reported to the caller, which keeps the transport
//! from starting.
//!
//! Tracks with no file configured can fall back to a small synthesized kit
//! (sine kick with a pitch drop, noise-and-tone snare, bright noise hat), so
//! the sequencer is playable without any samples on disk.

use std::{f32::consts::TAU, path::Path, sync::Arc};

use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::SessionConfig,
    error::{Error, Result},
    pattern::{TrackId, TRACK_COUNT},
};

/// Rate the fallback kit is synthesized at.
pub const SYNTH_SAMPLE_RATE: u32 = 44_100;

#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    pub sample_rate: u32,
    /// One `Vec` per channel, all the same length.
    pub channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    pub fn mono(sample_rate: u32, data: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![data],
        }
    }

    /// Decode a WAV file. Integer formats are scaled to [-1, 1).
    pub fn load_wav(path: &Path, track: TrackId) -> Result<Self> {
        let decode_err = |reason: String| Error::SampleDecode { track, reason };

        let mut reader = hound::WavReader::open(path)
            .map_err(|e| decode_err(format!("{}: {e}", path.display())))?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| decode_err(e.to_string()))?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| decode_err(e.to_string()))?
            }
        };

        let channel_count = spec.channels as usize;
        if channel_count == 0 {
            return Err(decode_err("file declares zero channels".into()));
        }
        if interleaved.is_empty() {
            return Err(decode_err("file contains no audio".into()));
        }

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels,
        })
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Average of all channels at `frame`; zero past the end.
    #[inline]
    pub fn mono_frame(&self, frame: usize) -> f32 {
        let count = self.channels.len();
        if count == 0 {
            return 0.0;
        }
        let sum: f32 = self
            .channels
            .iter()
            .map(|c| c.get(frame).copied().unwrap_or(0.0))
            .sum();
        sum / count as f32
    }
}

/// Build the fallback sound for `track`. Deterministic for a given rate.
pub fn synthesize(track: TrackId, sample_rate: u32) -> SampleBuffer {
    let sr = sample_rate.max(1) as f32;
    let mut rng = StdRng::seed_from_u64(0x5eed + track.index() as u64);

    let data = match track {
        TrackId::Kick => {
            // Pitch drops from 150 Hz to 50 Hz over the first 40 ms
            let len = (0.35 * sr) as usize;
            let mut phase = 0.0f32;
            (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    let freq = 50.0 + 100.0 * (-t / 0.04).exp();
                    phase = (phase + freq / sr).fract();
                    (TAU * phase).sin() * (-t / 0.12).exp()
                })
                .collect()
        }
        TrackId::Snare => {
            let len = (0.2 * sr) as usize;
            (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    let body = (TAU * 180.0 * t).sin() * (-t / 0.05).exp();
                    let rattle = rng.random_range(-1.0f32..1.0) * (-t / 0.07).exp();
                    0.3 * body + 0.7 * rattle
                })
                .collect()
        }
        TrackId::HiHat => {
            // First difference of white noise tilts it towards the top end
            let len = (0.06 * sr) as usize;
            let mut prev = 0.0f32;
            (0..len)
                .map(|i| {
                    let t = i as f32 / sr;
                    let noise = rng.random_range(-1.0f32..1.0);
                    let bright = 0.5 * (noise - prev);
                    prev = noise;
                    bright * (-t / 0.015).exp()
                })
                .collect()
        }
    };

    SampleBuffer::mono(sample_rate, data)
}

/// Decoded buffers for every track, shared with the voice trigger.
#[derive(Clone, Debug, Default)]
pub struct SampleBank {
    buffers: [Option<Arc<SampleBuffer>>; TRACK_COUNT],
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank holding the synthesized kit for every track.
    pub fn synthesized() -> Self {
        let mut bank = Self::new();
        for track in TrackId::ALL {
            bank.insert(track, synthesize(track, SYNTH_SAMPLE_RATE));
        }
        bank
    }

    /// Load every track named by `config`.
    ///
    /// Always returns a bank; tracks that failed are left empty and their
    /// errors are collected instead of aborting the whole load.
    pub fn load(config: &SessionConfig) -> (Self, Vec<Error>) {
        let mut bank = Self::new();
        let mut errors = Vec::new();

        for track in TrackId::ALL {
            match config.sample_path(track) {
                Some(path) => match SampleBuffer::load_wav(path, track) {
                    Ok(buffer) => {
                        info!(
                            "loaded {track} sample from {} ({} frames, {} ch, {} Hz)",
                            path.display(),
                            buffer.frames(),
                            buffer.channel_count(),
                            buffer.sample_rate
                        );
                        bank.insert(track, buffer);
                    }
                    Err(err) => {
                        warn!("{err}");
                        errors.push(err);
                    }
                },
                None if config.synthesize_missing() => {
                    info!("no {track} sample configured, using synthesized kit");
                    bank.insert(track, synthesize(track, SYNTH_SAMPLE_RATE));
                }
                None => {
                    let err = Error::SampleDecode {
                        track,
                        reason: "no sample configured".into(),
                    };
                    warn!("{err}");
                    errors.push(err);
                }
            }
        }

        (bank, errors)
    }

    pub fn insert(&mut self, track: TrackId, buffer: SampleBuffer) {
        self.buffers[track.index()] = Some(Arc::new(buffer));
    }

    pub fn get(&self, track: TrackId) -> Option<&Arc<SampleBuffer>> {
        self.buffers[track.index()].as_ref()
    }

    pub fn missing(&self) -> impl Iterator<Item = TrackId> + '_ {
        TrackId::ALL.into_iter().filter(|t| self.get(*t).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.missing().next().is_none()
    }
}
