//! Voice triggering and one-shot playback.
//!
//! The control thread turns an active step into a [`ScheduledEvent`]: it runs
//! the track's sample through the DSP kernel (memoized, since the kernel is
//! pure) and hands the result to a [`VoiceSink`] together with its output
//! time and gain. On the audio thread each event becomes a [`PlayingVoice`]
//! that starts on the exact frame its time maps to and plays to the end.
//!
//! There is no voice limit and no stealing: every trigger sounds in full.

use std::sync::Arc;

use log::warn;

use crate::{
    error::{Error, Result},
    kernel::{DspKernel, KernelError, KernelParams},
    pattern::{TrackId, TRACK_COUNT},
    samples::{SampleBank, SampleBuffer},
};

/// One voice to start at an absolute output-clock time.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub track: TrackId,
    /// Seconds on the output clock.
    pub time: f64,
    pub gain: f32,
    pub buffer: Arc<SampleBuffer>,
}

/// Where scheduled events go
pub trait VoiceSink {
    /// Hand one event over. Returns `false` if it was dropped.
    fn dispatch(&mut self, event: ScheduledEvent) -> bool;
}

impl VoiceSink for Vec<ScheduledEvent> {
    fn dispatch(&mut self, event: ScheduledEvent) -> bool {
        self.push(event);
        true
    }
}

impl VoiceSink for rtrb::Producer<ScheduledEvent> {
    fn dispatch(&mut self, event: ScheduledEvent) -> bool {
        self.push(event).is_ok()
    }
}

struct CachedBuffer {
    params: KernelParams,
    buffer: Arc<SampleBuffer>,
}

/// Runs samples through the kernel and dispatches the results.
pub struct VoiceTrigger<K> {
    kernel: K,
    bank: SampleBank,
    cache: [Option<CachedBuffer>; TRACK_COUNT],
}

impl<K: DspKernel> VoiceTrigger<K> {
    pub fn new(kernel: K, bank: SampleBank) -> Self {
        Self {
            kernel,
            bank,
            cache: [None, None, None],
        }
    }

    pub fn bank(&self) -> &SampleBank {
        &self.bank
    }

    /// Schedule `track` at `time` with `gain`.
    ///
    /// Returns `Ok(false)` when the track has no sample or the sink dropped
    /// the event. A kernel failure is returned as [`Error::Kernel`] and
    /// nothing is dispatched.
    pub fn trigger<S: VoiceSink + ?Sized>(
        &mut self,
        track: TrackId,
        time: f64,
        gain: f32,
        params: &KernelParams,
        sink: &mut S,
    ) -> Result<bool> {
        let Some(buffer) = self.processed(track, params)? else {
            return Ok(false);
        };

        let dispatched = sink.dispatch(ScheduledEvent {
            track,
            time,
            gain,
            buffer,
        });
        if !dispatched {
            warn!("event queue full, dropped {track} at {time:.3}s");
        }
        Ok(dispatched)
    }

    /// The kernel's output for `track` under `params`, from cache when the
    /// parameters have not changed since the last call.
    pub fn processed(&mut self, track: TrackId, params: &KernelParams) -> Result<Option<Arc<SampleBuffer>>> {
        let Some(raw) = self.bank.get(track) else {
            return Ok(None);
        };

        let slot = &mut self.cache[track.index()];
        if let Some(cached) = slot {
            if cached.params == *params {
                return Ok(Some(Arc::clone(&cached.buffer)));
            }
        }

        let kernel_err = |source| Error::Kernel { track, source };
        let mut channels = Vec::with_capacity(raw.channel_count());
        for input in &raw.channels {
            let output = self
                .kernel
                .process(input, raw.sample_rate as f32, params)
                .map_err(kernel_err)?;
            if output.len() != input.len() {
                return Err(kernel_err(KernelError::LengthMismatch {
                    expected: input.len(),
                    actual: output.len(),
                }));
            }
            channels.push(output);
        }

        let buffer = Arc::new(SampleBuffer {
            sample_rate: raw.sample_rate,
            channels,
        });
        *slot = Some(CachedBuffer {
            params: *params,
            buffer: Arc::clone(&buffer),
        });
        Ok(Some(buffer))
    }
}

/// A one-shot voice on the audio thread
///
/// Reads the buffer at its own rate with linear interpolation, downmixed to
/// mono, and adds it into the output starting at `start_frame`.
pub struct PlayingVoice {
    buffer: Arc<SampleBuffer>,
    gain: f32,
    start_frame: u64,
    pos: f64,
    step: f64,
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

impl PlayingVoice {
    pub fn new(event: ScheduledEvent, output_rate: f32) -> Self {
        let output_rate = output_rate.max(1.0) as f64;
        let start_frame = (event.time.max(0.0) * output_rate).round() as u64;
        let step = event.buffer.sample_rate as f64 / output_rate;
        Self {
            buffer: event.buffer,
            gain: event.gain,
            start_frame,
            pos: 0.0,
            step,
        }
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn buffer(&self) -> &Arc<SampleBuffer> {
        &self.buffer
    }

    pub fn is_finished(&self) -> bool {
        self.pos >= self.buffer.frames() as f64
    }

    /// Mix into `out`, whose first frame is `block_start` on the output
    /// clock. Returns `true` while the voice still has frames left.
    ///
    /// A voice whose start frame has already passed starts at the top of the
    /// block.
    pub fn render_into(&mut self, out: &mut [f32], block_start: u64) -> bool {
        let offset = self.start_frame.saturating_sub(block_start);
        if offset >= out.len() as u64 {
            return true;
        }

        let frames = self.buffer.frames();
        for sample in out[offset as usize..].iter_mut() {
            if self.pos >= frames as f64 {
                break;
            }
            let i = self.pos as usize;
            let frac = (self.pos - i as f64) as f32;
            let s0 = self.buffer.mono_frame(i);
            let s1 = if i + 1 < frames { self.buffer.mono_frame(i + 1) } else { s0 };

            *sample += lerp(s0, s1, frac) * self.gain;
            self.pos += self.step;
        }

        !self.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn params() -> KernelParams {
        KernelParams {
            master_gain: 1.0,
            reverb_enabled: false,
            cutoff_hz: 20_000.0,
        }
    }

    fn bank_with(track: TrackId, data: Vec<f32>) -> SampleBank {
        let mut bank = SampleBank::new();
        bank.insert(track, SampleBuffer::mono(48_000, data));
        bank
    }

    #[test]
    fn test_trigger_dispatches_processed_buffer() {
        let double = |input: &[f32], _: f32, _: &KernelParams| {
            Ok::<_, KernelError>(input.iter().map(|s| s * 2.0).collect::<Vec<f32>>())
        };
        let mut trigger = VoiceTrigger::new(double, bank_with(TrackId::Kick, vec![0.25, 0.5]));
        let mut sink = Vec::new();

        assert!(trigger.trigger(TrackId::Kick, 1.5, 0.8, &params(), &mut sink).unwrap());

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].time, 1.5);
        assert_eq!(sink[0].gain, 0.8);
        assert_eq!(sink[0].buffer.channels[0], vec![0.5, 1.0]);
    }

    #[test]
    fn test_missing_sample_is_silent() {
        let mut trigger = VoiceTrigger::new(
            |i: &[f32], _: f32, _: &KernelParams| Ok::<_, KernelError>(i.to_vec()),
            SampleBank::new(),
        );
        let mut sink = Vec::new();
        assert!(!trigger.trigger(TrackId::Snare, 0.0, 1.0, &params(), &mut sink).unwrap());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_kernel_runs_once_per_parameter_set() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counting = move |i: &[f32], _: f32, _: &KernelParams| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok::<_, KernelError>(i.to_vec())
        };
        let mut trigger = VoiceTrigger::new(counting, bank_with(TrackId::HiHat, vec![0.1; 8]));
        let mut sink = Vec::new();

        for _ in 0..4 {
            trigger.trigger(TrackId::HiHat, 0.0, 1.0, &params(), &mut sink).unwrap();
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);

        let mut changed = params();
        changed.reverb_enabled = true;
        trigger.trigger(TrackId::HiHat, 0.0, 1.0, &changed, &mut sink).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_kernel_errors_are_reported() {
        let failing = |_: &[f32], _: f32, _: &KernelParams| Err::<Vec<f32>, _>(KernelError::EmptyInput);
        let mut trigger = VoiceTrigger::new(failing, bank_with(TrackId::Kick, vec![0.1]));
        let mut sink = Vec::new();

        let err = trigger.trigger(TrackId::Kick, 0.0, 1.0, &params(), &mut sink).unwrap_err();
        assert!(matches!(err, Error::Kernel { track: TrackId::Kick, .. }));
        assert!(!err.blocks_start());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let truncating = |i: &[f32], _: f32, _: &KernelParams| Ok::<_, KernelError>(i[..1].to_vec());
        let mut trigger = VoiceTrigger::new(truncating, bank_with(TrackId::Kick, vec![0.1, 0.2, 0.3]));

        let err = trigger.processed(TrackId::Kick, &params()).unwrap_err();
        assert!(matches!(
            err,
            Error::Kernel {
                source: KernelError::LengthMismatch { expected: 3, actual: 1 },
                ..
            }
        ));
    }

    #[test]
    fn test_voice_starts_on_its_frame() {
        let event = ScheduledEvent {
            track: TrackId::Kick,
            time: 10.0 / 48_000.0,
            gain: 0.5,
            buffer: Arc::new(SampleBuffer::mono(48_000, vec![1.0, 1.0, 1.0])),
        };
        let mut voice = PlayingVoice::new(event, 48_000.0);
        assert_eq!(voice.start_frame(), 10);

        let mut first = [0.0f32; 8];
        assert!(voice.render_into(&mut first, 0));
        assert_eq!(first, [0.0; 8]);

        let mut second = [0.0f32; 8];
        let alive = voice.render_into(&mut second, 8);
        assert!(!alive);
        assert_eq!(second, [0.0, 0.0, 0.5, 0.5, 0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_voice_resamples_and_downmixes() {
        let buffer = SampleBuffer {
            sample_rate: 24_000,
            channels: vec![vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 0.0]],
        };
        let event = ScheduledEvent {
            track: TrackId::Snare,
            time: 0.0,
            gain: 1.0,
            buffer: Arc::new(buffer),
        };
        let mut voice = PlayingVoice::new(event, 48_000.0);
        let mut out = [0.0f32; 8];
        voice.render_into(&mut out, 0);

        // Half speed through [0, 0.5, 0] after the downmix
        assert_eq!(&out[..6], &[0.0, 0.25, 0.5, 0.25, 0.0, 0.0]);
    }
}
