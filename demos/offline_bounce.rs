//! Render a few bars of the starter pattern to a WAV file, no audio device.
//!
//! Run with: cargo run --example offline_bounce -- [out.wav] [sample-dir]

use std::{path::PathBuf, time::Instant};

use color_eyre::eyre::Result;
use swinglab::{
    engine::{write_wav, OfflineRenderer},
    SessionConfig, TrackId,
};

const SAMPLE_RATE: u32 = 48_000;
const BARS: f64 = 4.0;

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let out = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("bounce.wav"));
    let config = match args.next() {
        Some(dir) => SessionConfig::from_dir(PathBuf::from(dir)),
        None => SessionConfig::new(),
    }
    .with_env_overrides()?;

    let (mut session, mut renderer) = OfflineRenderer::session(&config, SAMPLE_RATE as f32);
    if let Some(err) = session.error() {
        eprintln!("warning: {err}");
    }

    // A little groove on top of the starter pattern
    session.set_swing(TrackId::HiHat, 70.0);
    session.set_swing(TrackId::Snare, 60.0);
    session.toggle_step(TrackId::Kick, 7);
    session.set_cutoff(6_000.0);
    session.set_distortion_enabled(true);
    session.set_distortion_amount(20.0);

    if !session.start(Instant::now()) {
        eprintln!("cannot start: {}", session.error().map_or_else(String::new, ToString::to_string));
        return Ok(());
    }

    let seconds = BARS * 4.0 * 60.0 / session.bpm();
    let samples = renderer.render(&mut session, seconds);
    write_wav(&out, &samples, SAMPLE_RATE)?;

    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    println!(
        "Rendered {} samples ({seconds:.2}s, peak {peak:.3}) to {}",
        samples.len(),
        out.display()
    );
    Ok(())
}
