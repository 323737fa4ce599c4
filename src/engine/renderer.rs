//! Audio-thread renderer.
//!
//! ```text
//!  control thread                          audio thread
//!  ──────────────                          ────────────
//!  EventSender ── ScheduledEvent ring ──→  Renderer
//!       ↑                                     │ voices → chain → device
//!       └──────── spent buffer ring ──────────┘
//! ```
//!
//! The renderer does not allocate on the audio thread. Buffers arrive inside
//! events, and when a voice finishes its buffer is sent back so the last
//! reference is dropped on the control thread. At most [`VOICE_CAPACITY`]
//! voices play at once; events arriving past that are returned unplayed.

use std::sync::Arc;

use log::debug;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    engine::clock::FrameClock,
    graph::chain::{ChainHandle, SignalChain},
    params::EffectParameters,
    samples::SampleBuffer,
    voice::{PlayingVoice, ScheduledEvent, VoiceSink},
    MAX_BLOCK_SIZE,
};

/// Events that can be in flight between a pump and the next block.
pub const EVENT_QUEUE_CAPACITY: usize = 256;
/// Voices that can sound at once.
pub const VOICE_CAPACITY: usize = 128;

pub struct Renderer {
    events: Consumer<ScheduledEvent>,
    retired: Producer<Arc<SampleBuffer>>,
    voices: Vec<PlayingVoice>,
    chain: SignalChain,
    clock: FrameClock,
    mix: Vec<f32>,
}

/// Control-thread side of the event and spent-buffer rings
pub struct EventSender {
    events: Producer<ScheduledEvent>,
    retired: Consumer<Arc<SampleBuffer>>,
}

impl EventSender {
    /// Drop every buffer the audio thread has finished with.
    pub fn collect_retired(&mut self) -> usize {
        let mut count = 0;
        while self.retired.pop().is_ok() {
            count += 1;
        }
        count
    }
}

impl VoiceSink for EventSender {
    fn dispatch(&mut self, event: ScheduledEvent) -> bool {
        self.collect_retired();
        self.events.dispatch(event)
    }
}

/// What the control thread keeps after [`connect`].
pub struct EngineHandle {
    pub sender: EventSender,
    pub clock: FrameClock,
    pub chain: ChainHandle,
}

/// Build a renderer and the handle that feeds it.
pub fn connect(sample_rate: f32, params: &EffectParameters) -> (Renderer, EngineHandle) {
    let (event_tx, event_rx) = RingBuffer::new(EVENT_QUEUE_CAPACITY);
    let (retired_tx, retired_rx) = RingBuffer::new(EVENT_QUEUE_CAPACITY);
    let (chain, chain_handle) = SignalChain::new(sample_rate, params);
    let clock = FrameClock::new(sample_rate);

    let renderer = Renderer {
        events: event_rx,
        retired: retired_tx,
        voices: Vec::with_capacity(VOICE_CAPACITY),
        chain,
        clock: clock.clone(),
        mix: vec![0.0; MAX_BLOCK_SIZE],
    };

    let handle = EngineHandle {
        sender: EventSender {
            events: event_tx,
            retired: retired_rx,
        },
        clock,
        chain: chain_handle,
    };

    (renderer, handle)
}

impl Renderer {
    pub fn sample_rate(&self) -> f32 {
        self.chain.sample_rate()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Fill an interleaved buffer of `channels` channels.
    ///
    /// The chain is mono; every output channel receives the same signal. The
    /// clock advances by the number of frames written.
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let sample_rate = self.sample_rate();

        for frames in out.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let len = frames.len() / channels;
            let block_start = self.clock.frames();

            while let Ok(event) = self.events.pop() {
                if self.voices.len() < VOICE_CAPACITY {
                    self.voices.push(PlayingVoice::new(event, sample_rate));
                } else {
                    debug!("voice limit reached, dropping {:?} at {:.3}s", event.track, event.time);
                    if self.retired.push(event.buffer).is_err() {
                        debug!("spent buffer ring full, releasing on the audio thread");
                    }
                }
            }

            let mix = &mut self.mix[..len];
            mix.fill(0.0);

            let retired = &mut self.retired;
            self.voices.retain_mut(|voice| {
                let alive = voice.render_into(mix, block_start);
                if !alive && retired.push(Arc::clone(voice.buffer())).is_err() {
                    debug!("spent buffer ring full, releasing on the audio thread");
                }
                alive
            });

            self.chain.process(mix);

            for (frame, &sample) in frames.chunks_exact_mut(channels).zip(mix.iter()) {
                frame.fill(sample);
            }

            self.clock.advance(len as u64);
        }
    }
}
