pub mod config;
pub mod dsp;
pub mod engine; // Output clock, renderer and devices
pub mod error;
pub mod graph; // Fixed effect chain built from block-rendering nodes
pub mod humanize;
pub mod kernel;
pub mod params;
pub mod pattern;
pub mod samples;
pub mod scheduler; // Look-ahead step scheduling
pub mod session;
pub mod voice;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use params::EffectParameters;
pub use pattern::{Pattern, StepCount, TrackId};
pub use session::Session;

pub const MAX_BLOCK_SIZE: usize = 2048;
