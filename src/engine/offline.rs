//! Render a session to memory instead of a device.
//!
//! The offline loop alternates one scheduling pass with one short block of
//! audio, which is what the live engine does when wake-ups arrive on time.
//! The output is therefore deterministic for a given session.

use std::path::Path;

use crate::{
    config::SessionConfig,
    engine::{
        clock::FrameClock,
        renderer::{connect, EventSender, Renderer},
    },
    error::{Error, Result},
    kernel::{DspKernel, SpectralKernel},
    samples::SampleBank,
    session::Session,
};

/// Frames rendered between scheduling passes.
pub const OFFLINE_BLOCK_FRAMES: usize = 256;

pub struct OfflineRenderer {
    renderer: Renderer,
}

impl OfflineRenderer {
    /// A session wired to an offline renderer, with samples loaded from
    /// `config`. Sample failures are recorded on the session.
    pub fn session(config: &SessionConfig, sample_rate: f32) -> (Session, Self) {
        let (bank, errors) = SampleBank::load(config);
        let (mut session, renderer) = Self::with_bank(config, bank, SpectralKernel::new(), sample_rate);
        for err in errors {
            session.report_error(err);
        }
        (session, renderer)
    }

    /// Like [`session`](Self::session) with an explicit bank and kernel.
    pub fn with_bank<K: DspKernel>(
        config: &SessionConfig,
        bank: SampleBank,
        kernel: K,
        sample_rate: f32,
    ) -> (Session<K, FrameClock, EventSender>, Self) {
        let (renderer, handle) = connect(sample_rate, &config.effect_parameters());
        let session = Session::with_parts(config, bank, kernel, handle.clock, handle.sender, Some(handle.chain));
        (session, Self { renderer })
    }

    pub fn sample_rate(&self) -> f32 {
        self.renderer.sample_rate()
    }

    /// Render `seconds` of mono audio, pumping `session` before every block.
    pub fn render<K: DspKernel>(
        &mut self,
        session: &mut Session<K, FrameClock, EventSender>,
        seconds: f64,
    ) -> Vec<f32> {
        let frames = (seconds.max(0.0) * self.sample_rate() as f64).round() as usize;
        let mut out = vec![0.0; frames];
        for block in out.chunks_mut(OFFLINE_BLOCK_FRAMES) {
            session.pump();
            self.renderer.render(block, 1);
        }
        out
    }
}

/// Write mono audio as a 32-bit float WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let io_err = |e: hound::Error| Error::Export(format!("{}: {e}", path.display()));

    let mut writer = hound::WavWriter::create(path, spec).map_err(io_err)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(io_err)?;
    }
    writer.finalize().map_err(io_err)
}
