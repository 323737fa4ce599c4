use crate::{
    dsp::distortion::{fill_curve, shape_buffer, CURVE_RESOLUTION},
    graph::node::{GraphNode, RenderCtx},
};

/// A filled transfer table and the amount it was built for
#[derive(Debug)]
pub struct ShaperCurve {
    amount: f32,
    table: Vec<f32>,
}

impl ShaperCurve {
    /// Fill `table` for `amount`, resizing it to the curve resolution if needed.
    pub fn build(amount: f32, mut table: Vec<f32>) -> Self {
        let amount = amount.clamp(0.0, 100.0);
        table.resize(CURVE_RESOLUTION, 0.0);
        fill_curve(&mut table, amount);
        Self { amount, table }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }
}

/// Table-driven waveshaper
///
/// The node only ever swaps in tables built elsewhere. Rebuilding a table
/// happens on the control thread, see [`ChainHandle`](super::ChainHandle).
pub struct WaveShaperNode {
    curve: ShaperCurve,
}

impl WaveShaperNode {
    pub fn new(amount: f32) -> Self {
        Self {
            curve: ShaperCurve::build(amount, Vec::with_capacity(CURVE_RESOLUTION)),
        }
    }

    pub fn amount(&self) -> f32 {
        self.curve.amount
    }

    pub fn curve(&self) -> &[f32] {
        &self.curve.table
    }

    /// Install `curve` and hand back the table it replaces.
    pub fn replace_curve(&mut self, curve: ShaperCurve) -> Vec<f32> {
        std::mem::replace(&mut self.curve, curve).table
    }
}

impl GraphNode for WaveShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        shape_buffer(&self.curve.table, out);
    }
}
