//! Benchmarks for individual processing stages.

mod compressor;
mod distortion;
mod filter;
mod kernel;
mod reverb;

pub use compressor::bench_compressor;
pub use distortion::bench_distortion;
pub use filter::bench_filter;
pub use kernel::bench_kernel;
pub use reverb::bench_reverb;
