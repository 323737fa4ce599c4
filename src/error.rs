use thiserror::Error;

use crate::{kernel::KernelError, pattern::TrackId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The output device or the signal chain could not be created.
    #[error("audio initialization failed: {0}")]
    Initialization(String),

    /// A track's sample could not be read; that track is silent.
    #[error("could not load {track} sample: {reason}")]
    SampleDecode { track: TrackId, reason: String },

    /// The DSP kernel rejected a buffer; the voice was skipped.
    #[error("kernel failed on {track}")]
    Kernel {
        track: TrackId,
        #[source]
        source: KernelError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not write audio: {0}")]
    Export(String),
}

impl Error {
    /// Whether this error keeps the transport from starting.
    pub fn blocks_start(&self) -> bool {
        matches!(self, Error::Initialization(_) | Error::SampleDecode { .. })
    }
}
