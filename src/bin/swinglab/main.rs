//! swinglab - terminal drum sequencer
//!
//! Run with: cargo run -- [sample-dir]
//!
//! The sample directory is searched for kick.wav, snare.wav and hihat.wav;
//! tracks without a file use the built-in kit. Logs go to swinglab.log
//! (filter with RUST_LOG).

mod app;
mod ui;

use std::{fs::File, path::PathBuf};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use swinglab::{Session, SessionConfig};

use app::App;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = SessionConfig::from_dir(&dir)
        .with_env_overrides()
        .wrap_err("invalid environment override")?;

    let (session, device) = Session::open(&config);

    let mut terminal = ratatui::init();
    let result = App::new(session, device).run(&mut terminal);
    ratatui::restore();
    result
}

fn init_logging() -> EyreResult<()> {
    let file = File::create("swinglab.log").wrap_err("failed to create swinglab.log")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
