//! # Cadence
//!
//! Console front end for the playback session. Plays a JSON playlist through
//! the threaded engine and its simulated media backend.
//!
//! ```text
//! cadence playlist.json [config.json]
//! ```

mod commands;
mod config;
mod console;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cadence_engine::{SimulatedBackend, ThreadedEngine};
use cadence_player::PlaybackController;
use config::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cadence=info,cadence_player=debug,cadence_engine=info".into()
            }),
        )
        .init();

    info!("Starting Cadence v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let Some(playlist_path) = args.next() else {
        bail!("usage: cadence <playlist.json> [config.json]");
    };
    let config = match args.next() {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::load_default()?,
    };

    let playlist = config::load_playlist(&playlist_path)
        .with_context(|| format!("reading playlist {}", playlist_path.display()))?;

    let engine = ThreadedEngine::new(SimulatedBackend, config.engine)?;
    let controller = PlaybackController::with_engine(engine, config.player);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    runtime.block_on(console::run(controller, playlist))
}
