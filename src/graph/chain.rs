//! The fixed drum-bus chain.
//!
//! ```text
//!                         ┌──────────── dry ─────────────────────────────┐
//! input ──→ [lowpass] ──┤                                               (+) ──→ output
//!                         └─→ [shaper] → [gain] → [compressor] → [gain] ─┘
//!                                         dist                    comp
//! ```
//!
//! The topology is built once. Turning an effect off sets its gain target to
//! zero; no node is ever removed or rebuilt. The two wet gains are
//! independent, so the compressor only hears anything while distortion is
//! also on.
//!
//! The control thread writes parameters through a [`ChainHandle`]. The audio
//! thread picks them up at the start of every [`SignalChain::process`] call
//! with relaxed atomic loads.
//!
//! The distortion table is too large to rebuild inside a block, so it travels
//! separately:
//!
//! ```text
//!  ChainHandle ── ShaperCurve ring ──→ SignalChain
//!       ↑                                   │
//!       └────── spent table ring ───────────┘
//! ```
//!
//! The handle fills a table whenever the amount changes, reusing a spent one
//! when it can, and the audio thread only swaps tables.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::debug;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    dsp::distortion::CURVE_RESOLUTION,
    graph::{
        compressor::CompressorNode,
        distortion::{ShaperCurve, WaveShaperNode},
        filter::FilterNode,
        gain::GainNode,
        node::{GraphNode, RenderCtx},
    },
    params::{AtomicF32, EffectParameters},
    MAX_BLOCK_SIZE,
};

/// Distortion tables that can be waiting for the audio thread.
const CURVE_QUEUE_CAPACITY: usize = 4;

/// Live chain parameters shared between the control and audio threads
#[derive(Debug)]
pub struct ChainParams {
    cutoff_hz: AtomicF32,
    distortion_enabled: AtomicBool,
    compression_amount: AtomicF32,
    compression_enabled: AtomicBool,
}

impl ChainParams {
    fn new(params: &EffectParameters) -> Self {
        Self {
            cutoff_hz: AtomicF32::new(params.cutoff_hz()),
            distortion_enabled: AtomicBool::new(params.distortion_enabled()),
            compression_amount: AtomicF32::new(params.compression_amount()),
            compression_enabled: AtomicBool::new(params.compression_enabled()),
        }
    }
}

/// Control-thread side of the chain.
#[derive(Debug)]
pub struct ChainHandle {
    params: Arc<ChainParams>,
    curves: Producer<ShaperCurve>,
    spent: Consumer<Vec<f32>>,
    /// Amount of the newest table handed to the audio thread.
    sent_amount: f32,
}

impl ChainHandle {
    /// Publish `params` to the running chain.
    ///
    /// A distortion amount change builds the new table here. If the curve
    /// ring is full the change is retried on the next call.
    pub fn apply(&mut self, params: &EffectParameters) {
        let p = &self.params;
        p.cutoff_hz.store(params.cutoff_hz());
        p.distortion_enabled.store(params.distortion_enabled(), Ordering::Relaxed);
        p.compression_amount.store(params.compression_amount());
        p.compression_enabled.store(params.compression_enabled(), Ordering::Relaxed);

        let amount = params.distortion_amount().clamp(0.0, 100.0);
        if amount != self.sent_amount {
            self.send_curve(amount);
        }
    }

    fn send_curve(&mut self, amount: f32) {
        if self.curves.is_full() {
            debug!("distortion curve queue full, deferring amount {amount}");
            return;
        }
        let table = self
            .spent
            .pop()
            .unwrap_or_else(|_| Vec::with_capacity(CURVE_RESOLUTION));
        if self.curves.push(ShaperCurve::build(amount, table)).is_ok() {
            self.sent_amount = amount;
        }
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.params.cutoff_hz.load()
    }
}

#[inline]
fn enabled_gain(enabled: bool) -> f32 {
    if enabled {
        1.0
    } else {
        0.0
    }
}

pub struct SignalChain {
    ctx: RenderCtx,
    params: Arc<ChainParams>,
    curves: Consumer<ShaperCurve>,
    spent: Producer<Vec<f32>>,
    filter: FilterNode,
    shaper: WaveShaperNode,
    distortion_gain: GainNode,
    compressor: CompressorNode,
    compression_gain: GainNode,
    wet: Vec<f32>,
}

impl SignalChain {
    pub fn new(sample_rate: f32, params: &EffectParameters) -> (Self, ChainHandle) {
        let shared = Arc::new(ChainParams::new(params));
        let (curve_tx, curve_rx) = RingBuffer::new(CURVE_QUEUE_CAPACITY);
        let (spent_tx, spent_rx) = RingBuffer::new(CURVE_QUEUE_CAPACITY);
        let shaper = WaveShaperNode::new(params.distortion_amount());
        let sent_amount = shaper.amount();

        let chain = Self {
            ctx: RenderCtx::new(sample_rate),
            params: Arc::clone(&shared),
            curves: curve_rx,
            spent: spent_tx,
            filter: FilterNode::lowpass(params.cutoff_hz()),
            shaper,
            distortion_gain: GainNode::new(enabled_gain(params.distortion_enabled())),
            compressor: CompressorNode::new(params.compression_amount(), sample_rate),
            compression_gain: GainNode::new(enabled_gain(params.compression_enabled())),
            wet: vec![0.0; MAX_BLOCK_SIZE],
        };

        let handle = ChainHandle {
            params: shared,
            curves: curve_tx,
            spent: spent_rx,
            sent_amount,
        };

        (chain, handle)
    }

    pub fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate
    }

    fn sync_params(&mut self) {
        let p = &self.params;
        self.filter.set_cutoff(p.cutoff_hz.load());
        while let Ok(curve) = self.curves.pop() {
            let table = self.shaper.replace_curve(curve);
            if self.spent.push(table).is_err() {
                debug!("spent curve ring full, releasing on the audio thread");
            }
        }
        self.distortion_gain
            .set_target(enabled_gain(p.distortion_enabled.load(Ordering::Relaxed)));
        self.compressor.set_amount(p.compression_amount.load());
        self.compression_gain
            .set_target(enabled_gain(p.compression_enabled.load(Ordering::Relaxed)));
    }

    /// Run `buffer` (mono) through the chain in place.
    pub fn process(&mut self, buffer: &mut [f32]) {
        self.sync_params();

        for block in buffer.chunks_mut(MAX_BLOCK_SIZE) {
            self.filter.render_block(block, &self.ctx);

            let wet = &mut self.wet[..block.len()];
            wet.copy_from_slice(block);
            self.shaper.render_block(wet, &self.ctx);
            self.distortion_gain.render_block(wet, &self.ctx);
            self.compressor.render_block(wet, &self.ctx);
            self.compression_gain.render_block(wet, &self.ctx);

            for (out, w) in block.iter_mut().zip(wet.iter()) {
                *out += *w;
            }
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.compressor.reset();
        self.distortion_gain.reset();
        self.compression_gain.reset();
    }

    #[cfg(test)]
    pub(crate) fn shaper(&self) -> &WaveShaperNode {
        &self.shaper
    }

    #[cfg(test)]
    pub(crate) fn compressor(&self) -> &CompressorNode {
        &self.compressor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{distortion::make_curve, filter::SVFilter};

    fn burst(len: usize) -> Vec<f32> {
        (0..len).map(|i| (i as f32 * 0.07).sin() * 0.8).collect()
    }

    #[test]
    fn test_disabled_effects_pass_only_filtered_dry() {
        let params = EffectParameters::default();
        let (mut chain, _handle) = SignalChain::new(48_000.0, &params);

        let mut buffer = burst(3000);
        let mut expected = buffer.clone();
        chain.process(&mut buffer);

        SVFilter::lowpass(params.cutoff_hz(), 1.0).render(&mut expected, 48_000.0);
        for (a, b) in buffer.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_handle_updates_live_nodes() {
        let mut params = EffectParameters::default();
        let (mut chain, mut handle) = SignalChain::new(44_100.0, &params);

        params.set_distortion_amount(70.0);
        params.set_compression_amount(100.0);
        params.set_cutoff_hz(500.0);
        handle.apply(&params);
        assert_eq!(handle.cutoff_hz(), 500.0);

        chain.process(&mut [0.0; 16]);

        assert_eq!(chain.shaper().curve(), make_curve(70.0).as_slice());
        assert_eq!(chain.compressor().settings().ratio, 11.0);
        assert_eq!(chain.compressor().settings().threshold_db, 0.0);
    }

    #[test]
    fn test_curve_tables_are_recycled() {
        let mut params = EffectParameters::default();
        let (mut chain, mut handle) = SignalChain::new(48_000.0, &params);
        let first = chain.shaper().curve().as_ptr();

        params.set_distortion_amount(70.0);
        handle.apply(&params);
        chain.process(&mut [0.0; 16]);
        assert_eq!(chain.shaper().amount(), 70.0);
        assert_ne!(chain.shaper().curve().as_ptr(), first);

        // The table retired above is filled again for the next change
        params.set_distortion_amount(20.0);
        handle.apply(&params);
        chain.process(&mut [0.0; 16]);
        assert_eq!(chain.shaper().curve(), make_curve(20.0).as_slice());
        assert_eq!(chain.shaper().curve().as_ptr(), first);
    }

    #[test]
    fn test_unchanged_amount_sends_no_curve() {
        let params = EffectParameters::default();
        let (_chain, mut handle) = SignalChain::new(48_000.0, &params);

        handle.apply(&params);
        handle.apply(&params);

        assert_eq!(handle.curves.slots(), CURVE_QUEUE_CAPACITY);
    }

    #[test]
    fn test_full_curve_queue_defers_latest_amount() {
        let mut params = EffectParameters::default();
        let (mut chain, mut handle) = SignalChain::new(48_000.0, &params);

        for amount in 1..=CURVE_QUEUE_CAPACITY + 1 {
            params.set_distortion_amount(amount as f32 * 10.0);
            handle.apply(&params);
        }
        chain.process(&mut [0.0; 16]);
        assert_eq!(chain.shaper().amount(), CURVE_QUEUE_CAPACITY as f32 * 10.0);

        handle.apply(&params);
        chain.process(&mut [0.0; 16]);
        assert_eq!(chain.shaper().amount(), (CURVE_QUEUE_CAPACITY + 1) as f32 * 10.0);
    }

    #[test]
    fn test_wet_path_needs_distortion() {
        let mut params = EffectParameters::default();
        params.set_compression_enabled(true);
        params.set_compression_amount(50.0);

        let dry_only = {
            let (mut chain, _) = SignalChain::new(48_000.0, &EffectParameters::default());
            let mut buffer = burst(1024);
            chain.process(&mut buffer);
            buffer
        };

        let (mut chain, _) = SignalChain::new(48_000.0, &params);
        let mut buffer = burst(1024);
        chain.process(&mut buffer);
        assert_eq!(buffer, dry_only);

        params.set_distortion_enabled(true);
        params.set_distortion_amount(50.0);
        let (mut chain, _) = SignalChain::new(48_000.0, &params);
        let mut wet = burst(1024);
        chain.process(&mut wet);
        assert_ne!(wet, dry_only);
    }

    #[test]
    fn test_toggle_glides_instead_of_jumping() {
        let mut params = EffectParameters::default();
        params.set_distortion_enabled(true);
        params.set_compression_enabled(true);
        params.set_distortion_amount(100.0);
        let (mut chain, mut handle) = SignalChain::new(48_000.0, &params);

        let mut warm = vec![0.5; 512];
        chain.process(&mut warm);

        params.set_distortion_enabled(false);
        handle.apply(&params);

        let mut block = vec![0.5; 512];
        chain.process(&mut block);

        // First sample still carries almost all of the wet signal
        assert!((block[0] - warm[511]).abs() < 0.05, "{} vs {}", block[0], warm[511]);
        let dc_dry = 0.5;
        assert!((block[511] - dc_dry).abs() < 0.05, "{}", block[511]);
    }

    #[test]
    fn test_long_buffers_are_chunked() {
        let (mut chain, _) = SignalChain::new(48_000.0, &EffectParameters::default());
        let mut buffer = vec![0.25; MAX_BLOCK_SIZE * 2 + 17];
        chain.process(&mut buffer);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
