//! Console front end: reads commands from stdin and keeps the session in
//! sync with the engine.

use anyhow::Result;
use cadence_core::Track;
use cadence_engine::EngineAdapter;
use cadence_player::{PlaybackController, Synchronizer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::commands::{Command, HELP};

/// Whether the console should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Apply one command to the controller.
pub fn apply<E: EngineAdapter>(
    controller: &mut PlaybackController<E>,
    playlist: &[Track],
    command: Command,
) -> Result<Flow> {
    match command {
        Command::Play(index) => {
            let track = playlist.get(index).cloned();
            let cover = track.as_ref().and_then(|t| t.cover_art_uri.clone());
            controller.play(track, playlist.to_vec(), cover, index)?;
        }
        Command::Pause => controller.pause(),
        Command::Toggle => controller.toggle_play_pause(),
        Command::Next => controller.next()?,
        Command::Previous => controller.previous()?,
        Command::Seek(seconds) => controller.seek(seconds),
        Command::Volume(level) => controller.set_volume(level),
        Command::Minimize => controller.set_minimized(true),
        Command::Maximize => controller.set_minimized(false),
        Command::Hide => controller.set_visible(false),
        Command::Show => controller.set_visible(true),
        Command::Status => println!("{}", serde_json::to_string_pretty(controller.session())?),
        Command::Help => println!("{HELP}"),
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Run until `quit` or end of input.
pub async fn run<E: EngineAdapter>(
    mut controller: PlaybackController<E>,
    playlist: Vec<Track>,
) -> Result<()> {
    let mut sync = Synchronizer::for_controller(&controller);
    let mut ticker = interval(controller.config().sync_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!("Ready with {} tracks, type `help` for commands", playlist.len());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let delivered = sync.pump(&mut controller);
                if delivered > 0 {
                    debug!("Delivered {delivered} engine signals");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        warn!("{e}");
                        continue;
                    }
                };
                match apply(&mut controller, &playlist, command) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => warn!("{e}"),
                }
            }
        }
    }

    sync.unbind();
    controller.shutdown();
    info!("Goodbye");
    Ok(())
}
