use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, RenderCtx},
};

/// The chain runs its low-pass at a fixed Q of 1.
pub const CHAIN_Q: f32 = 1.0;

/// Low-pass filter node at the head of the chain
pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::lowpass(cutoff_hz, CHAIN_Q),
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.filter.cutoff_hz
    }

    /// Retune in place; filter memory is kept so the sweep is continuous.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.filter.set_cutoff(cutoff_hz);
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx.sample_rate);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
