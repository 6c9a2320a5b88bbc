//! Threaded playback engine driving a [`MediaBackend`] on a worker thread.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cadence_core::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::adapter::{AttemptId, EngineAdapter, EngineSignal, StartOutcome};
use crate::backend::{MediaBackend, MediaInfo};
use crate::config::EngineConfig;
use crate::signals::SignalHub;

/// Playback state of the engine worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No media loaded.
    #[default]
    Stopped,
    /// Media assigned, data not ready yet.
    Buffering,
    /// Media ready, not playing.
    Paused,
    Playing,
}

/// Commands to control the engine worker.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Load a new source.
    Load(String),
    /// Start or resume playback for the given attempt.
    Play(AttemptId),
    /// Pause playback, keeping position.
    Pause,
    /// Seek to a position in seconds.
    Seek(f64),
    /// Set volume (0.0 to 1.0).
    SetVolume(f32),
    /// Shutdown the worker.
    Shutdown,
}

/// Playback engine backed by a worker thread.
///
/// `start` never succeeds synchronously: once a source is assigned it returns
/// [`StartOutcome::Pending`] and the worker answers with
/// [`EngineSignal::StartResolved`]. A start issued before the media finished
/// buffering is rejected.
pub struct ThreadedEngine {
    /// Current playback state.
    state: Arc<RwLock<PlaybackState>>,
    /// Current volume (0.0 to 1.0).
    volume: Arc<Mutex<f32>>,
    /// Playhead shared with the worker.
    playhead: Arc<RwLock<Playhead>>,
    /// Total duration in seconds, once known.
    duration: Arc<RwLock<Option<f64>>>,
    /// Source most recently assigned through `load`.
    source: Option<String>,
    command_tx: Sender<EngineCommand>,
    hub: SignalHub,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedEngine {
    /// Create a new engine and spawn its worker.
    pub fn new<B: MediaBackend>(backend: B, config: EngineConfig) -> Result<Self> {
        let (command_tx, command_rx) = unbounded();
        let hub = SignalHub::new();

        let state = Arc::new(RwLock::new(PlaybackState::Stopped));
        let volume = Arc::new(Mutex::new(0.5f32));
        let playhead = Arc::new(RwLock::new(Playhead::default()));
        let duration = Arc::new(RwLock::new(None));

        let worker = EngineWorker {
            command_rx,
            hub: hub.clone(),
            state: state.clone(),
            volume: volume.clone(),
            playhead: playhead.clone(),
            duration: duration.clone(),
            config,
            backend,
            media: None,
            failed_load: None,
            last_position_update: Instant::now(),
        };

        let handle = std::thread::Builder::new()
            .name("playback-engine".to_string())
            .spawn(move || worker.run())
            .map_err(|e| Error::Engine(format!("Failed to spawn engine thread: {e}")))?;

        Ok(Self {
            state,
            volume,
            playhead,
            duration,
            source: None,
            command_tx,
            hub,
            worker: Some(handle),
        })
    }

    /// Get the current playback state.
    pub fn state(&self) -> PlaybackState {
        *self.state.read()
    }

    /// Get the current volume.
    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    /// Get the total duration in seconds.
    pub fn duration(&self) -> Option<f64> {
        *self.duration.read()
    }

    /// Source most recently assigned.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Send a command to the worker.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|e| Error::Engine(format!("Failed to send command: {e}")))
    }

    /// Stop the worker and wait for it to exit.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        let _ = self.command_tx.send(EngineCommand::Shutdown);
        if handle.join().is_err() {
            error!("Engine worker panicked");
        }
    }
}

impl EngineAdapter for ThreadedEngine {
    fn load(&mut self, uri: &str) -> Result<()> {
        // Reset before the worker can publish the new media's duration.
        self.playhead.write().reset();
        *self.duration.write() = None;
        self.send_command(EngineCommand::Load(uri.to_string()))?;
        self.source = Some(uri.to_string());
        Ok(())
    }

    fn start(&mut self, attempt: AttemptId) -> StartOutcome {
        if self.source.is_none() {
            return StartOutcome::Rejected("no source loaded".to_string());
        }
        match self.send_command(EngineCommand::Play(attempt)) {
            Ok(()) => StartOutcome::Pending,
            Err(e) => StartOutcome::Rejected(e.to_string()),
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.send_command(EngineCommand::Pause)
    }

    fn set_position(&mut self, seconds: f64) -> Result<()> {
        let target = clamp_position(seconds, self.duration());
        self.playhead.write().seek(target);
        self.send_command(EngineCommand::Seek(target))
    }

    fn position(&self) -> f64 {
        clamp_position(self.playhead.read().position(), self.duration())
    }

    fn set_volume(&mut self, level: f32) -> Result<()> {
        let level = level.clamp(0.0, 1.0);
        *self.volume.lock() = level;
        self.send_command(EngineCommand::SetVolume(level))
    }

    fn subscribe(&self) -> Receiver<EngineSignal> {
        self.hub.subscribe()
    }
}

impl Drop for ThreadedEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn clamp_position(seconds: f64, duration: Option<f64>) -> f64 {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    duration.map_or(seconds, |d| seconds.min(d))
}

/// Position bookkeeping: a base position plus the instant playback resumed.
#[derive(Debug, Clone, Copy, Default)]
struct Playhead {
    base: f64,
    running_since: Option<Instant>,
}

impl Playhead {
    fn position(&self) -> f64 {
        self.running_since
            .map_or(self.base, |since| self.base + since.elapsed().as_secs_f64())
    }

    fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    fn run(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    fn halt_at(&mut self, position: f64) {
        self.base = position;
        self.running_since = None;
    }

    fn seek(&mut self, position: f64) {
        self.base = position;
        if self.running_since.is_some() {
            self.running_since = Some(Instant::now());
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Media the worker currently holds.
struct LoadedMedia {
    uri: String,
    info: MediaInfo,
    ready_at: Instant,
    ready: bool,
}

/// Internal worker that owns the backend and advances the playhead.
struct EngineWorker<B> {
    command_rx: Receiver<EngineCommand>,
    hub: SignalHub,
    state: Arc<RwLock<PlaybackState>>,
    volume: Arc<Mutex<f32>>,
    playhead: Arc<RwLock<Playhead>>,
    duration: Arc<RwLock<Option<f64>>>,
    config: EngineConfig,
    backend: B,
    media: Option<LoadedMedia>,
    /// Source whose last `open` failed, with the failure message.
    failed_load: Option<(String, String)>,
    last_position_update: Instant,
}

impl<B: MediaBackend> EngineWorker<B> {
    fn run(mut self) {
        info!("Playback engine worker started");

        loop {
            match self.command_rx.recv_timeout(self.next_wake()) {
                Ok(EngineCommand::Shutdown) => {
                    info!("Playback engine shutting down");
                    break;
                }
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Command channel closed, shutting down");
                    break;
                }
            }

            self.poll_loading();

            if *self.state.read() == PlaybackState::Playing {
                self.advance_playhead();
            }
        }
    }

    /// How long to block for the next command.
    fn next_wake(&self) -> Duration {
        let mut wake = self.config.idle_poll();
        if let Some(media) = self.media.as_ref().filter(|m| !m.ready) {
            wake = wake.min(media.ready_at.saturating_duration_since(Instant::now()));
        }
        if *self.state.read() == PlaybackState::Playing {
            wake = wake.min(self.config.position_interval());
        }
        wake
    }

    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Load(uri) => self.load(uri),
            EngineCommand::Play(attempt) => self.play(attempt),
            EngineCommand::Pause => {
                if *self.state.read() == PlaybackState::Playing {
                    let mut playhead = self.playhead.write();
                    let position = playhead.position();
                    playhead.halt_at(position);
                    drop(playhead);
                    self.set_state(PlaybackState::Paused);
                }
            }
            EngineCommand::Seek(pos) => self.seek_to(pos),
            EngineCommand::SetVolume(vol) => {
                *self.volume.lock() = vol;
            }
            EngineCommand::Shutdown => {
                // Handled in the main loop
            }
        }
    }

    fn load(&mut self, uri: String) {
        debug!("Loading {uri}");
        self.playhead.write().reset();
        *self.duration.write() = None;

        self.failed_load = None;

        match self.backend.open(&uri) {
            Ok(info) => {
                self.media = Some(LoadedMedia {
                    uri,
                    info,
                    ready_at: Instant::now() + info.load_latency,
                    ready: false,
                });
                self.set_state(PlaybackState::Buffering);
            }
            Err(e) => {
                error!("Failed to open media: {e}");
                self.media = None;
                self.set_state(PlaybackState::Stopped);
                let message = e.to_string();
                self.hub.emit(EngineSignal::Error {
                    uri: uri.clone(),
                    message: message.clone(),
                });
                self.failed_load = Some((uri, message));
            }
        }
    }

    fn poll_loading(&mut self) {
        let Some(media) = self.media.as_mut() else {
            return;
        };
        if media.ready || Instant::now() < media.ready_at {
            return;
        }

        media.ready = true;
        let uri = media.uri.clone();
        let duration = media.info.duration;
        *self.duration.write() = Some(duration);
        self.set_state(PlaybackState::Paused);

        info!("Media ready: {uri} ({duration:.2}s)");
        self.hub.emit(EngineSignal::MetadataReady {
            uri: uri.clone(),
            duration,
        });
        self.hub.emit(EngineSignal::DataLoaded { uri });
    }

    fn play(&mut self, attempt: AttemptId) {
        // A source that failed to open fails every start.
        if let Some((uri, message)) = self.failed_load.clone() {
            warn!("Start {attempt:?} rejected: {uri} failed to open");
            self.hub.emit(EngineSignal::Error {
                uri: uri.clone(),
                message: message.clone(),
            });
            self.hub.emit(EngineSignal::StartResolved {
                attempt,
                uri,
                result: Err(message),
            });
            return;
        }

        let result = match self.media.as_ref() {
            None => Err("no source loaded".to_string()),
            Some(media) if !media.ready => Err("media data not loaded yet".to_string()),
            Some(media) => {
                let mut playhead = self.playhead.write();
                if playhead.position() >= media.info.duration {
                    playhead.halt_at(0.0);
                }
                if !playhead.is_running() {
                    playhead.run();
                    self.last_position_update = Instant::now();
                }
                drop(playhead);
                self.set_state(PlaybackState::Playing);
                Ok(())
            }
        };

        if let Err(reason) = &result {
            warn!("Start {attempt:?} rejected: {reason}");
        }

        let uri = self
            .media
            .as_ref()
            .map(|m| m.uri.clone())
            .unwrap_or_default();
        self.hub.emit(EngineSignal::StartResolved {
            attempt,
            uri,
            result,
        });
    }

    /// The handle has already moved the playhead; report where it landed.
    fn seek_to(&self, position_secs: f64) {
        let Some(media) = self.media.as_ref() else {
            return;
        };
        debug!("Seeked to {:.2} seconds", position_secs);
        self.hub.emit(EngineSignal::TimeUpdated {
            uri: media.uri.clone(),
            seconds: self.playhead.read().position().min(media.info.duration),
        });
    }

    fn advance_playhead(&mut self) {
        let Some(media) = self.media.as_ref() else {
            return;
        };
        let uri = media.uri.clone();
        let duration = media.info.duration;
        let position = self.playhead.read().position();

        if position >= duration {
            info!("Playback finished: {uri}");
            self.playhead.write().halt_at(duration);
            self.set_state(PlaybackState::Paused);
            self.hub.emit(EngineSignal::TimeUpdated {
                uri: uri.clone(),
                seconds: duration,
            });
            self.hub.emit(EngineSignal::Ended { uri });
            return;
        }

        if self.last_position_update.elapsed() >= self.config.position_interval() {
            self.last_position_update = Instant::now();
            self.hub.emit(EngineSignal::TimeUpdated {
                uri,
                seconds: position,
            });
        }
    }

    fn set_state(&self, new_state: PlaybackState) {
        let old_state = {
            let mut state = self.state.write();
            let old = *state;
            *state = new_state;
            old
        };

        if old_state != new_state {
            debug!("State changed: {:?} -> {:?}", old_state, new_state);
        }
    }
}
