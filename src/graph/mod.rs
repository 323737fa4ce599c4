//! Block-rendering nodes and the fixed signal chain they form.
//!
//! Graph nodes wrap the low-level DSP primitives with what the live chain
//! needs: block rendering, in-place retuning and state reset. The `chain`
//! module wires them into the one topology every session uses.

/// The fixed drum-bus chain and its lock-free parameter handle.
pub mod chain;
/// Compressor node driven by a single amount.
pub mod compressor;
/// Table-driven waveshaper fed with curves built off the audio thread.
pub mod distortion;
/// Topology-preserving low-pass node.
pub mod filter;
/// Gain stage with block-length ramps.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;

pub use chain::{ChainHandle, SignalChain};
pub use node::{GraphNode, RenderCtx};
