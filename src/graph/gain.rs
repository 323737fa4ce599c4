use crate::graph::node::{GraphNode, RenderCtx};

/// Gain stage that glides to a new target across one block
///
/// Jumping straight from 1 to 0 mid-signal clicks, so a target change is
/// spread linearly over the next rendered block.
pub struct GainNode {
    current: f32,
    target: f32,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self {
            current: gain,
            target: gain,
        }
    }

    pub fn set_target(&mut self, gain: f32) {
        self.target = gain;
    }

    /// Gain applied at the end of the last block.
    pub fn current(&self) -> f32 {
        self.current
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        if out.is_empty() {
            return;
        }

        if self.current == self.target {
            let gain = self.current;
            for sample in out.iter_mut() {
                *sample *= gain;
            }
            return;
        }

        let step = (self.target - self.current) / out.len() as f32;
        let mut gain = self.current;
        for sample in out.iter_mut() {
            gain += step;
            *sample *= gain;
        }
        self.current = self.target;
    }

    fn reset(&mut self) {
        self.current = self.target;
    }
}
