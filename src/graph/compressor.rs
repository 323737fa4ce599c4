use crate::{
    dsp::compressor::{Compressor, CompressorSettings},
    graph::node::{GraphNode, RenderCtx},
};

/// Compressor node driven by a single 0 to 100 amount
pub struct CompressorNode {
    compressor: Compressor,
    amount: f32,
}

impl CompressorNode {
    pub fn new(amount: f32, sample_rate: f32) -> Self {
        let amount = amount.clamp(0.0, 100.0);
        Self {
            compressor: Compressor::new(CompressorSettings::from_amount(amount), sample_rate),
            amount,
        }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn settings(&self) -> CompressorSettings {
        self.compressor.settings()
    }

    pub fn set_amount(&mut self, amount: f32) {
        let amount = amount.clamp(0.0, 100.0);
        if amount != self.amount {
            self.compressor.set_settings(CompressorSettings::from_amount(amount));
            self.amount = amount;
        }
    }
}

impl GraphNode for CompressorNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.compressor.process_buffer(out);
    }

    fn reset(&mut self) {
        self.compressor.reset();
    }
}
