//! Real-world scenario benchmarks.
//!
//! These run the audio-thread path as the device callback drives it: the full
//! effect chain, and the renderer mixing several voices into it.

mod chain;
mod renderer;

pub use chain::bench_chain;
pub use renderer::bench_renderer;
