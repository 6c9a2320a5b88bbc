//! Playback controller: the session state machine and its start recovery.

use cadence_core::{Error, Queue, Result, Track, Volume};
use cadence_engine::{AttemptId, EngineAdapter, EngineSignal, StartOutcome};
use tracing::{debug, error, info, warn};

use crate::config::PlayerConfig;
use crate::session::{PlaybackSession, PlayerState};

/// Which try of the current start this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartPhase {
    First,
    Retry,
}

/// A start whose outcome the engine will report later.
#[derive(Debug, Clone, Copy)]
struct PendingStart {
    attempt: AttemptId,
    phase: StartPhase,
}

/// Drives one playback engine for the "now playing" session.
///
/// All commands are synchronous and never block. Engine failures are turned
/// into session state; only caller mistakes (bad index, empty queue) come
/// back as errors.
///
/// Every new start bumps the current [`AttemptId`]. Pending resolutions and
/// armed retries remember the attempt they belong to and are ignored once it
/// is no longer current.
pub struct PlaybackController<E> {
    engine: Option<E>,
    session: PlaybackSession,
    config: PlayerConfig,
    /// Current start attempt.
    attempt: AttemptId,
    /// Start waiting for `StartResolved`.
    pending: Option<PendingStart>,
    /// Attempt that retries when the engine reports data loaded.
    retry_armed: Option<AttemptId>,
}

impl<E: EngineAdapter> PlaybackController<E> {
    /// Create a controller without an engine.
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            engine: None,
            session: PlaybackSession::new(config.initial_volume),
            config,
            attempt: AttemptId::default(),
            pending: None,
            retry_armed: None,
        }
    }

    /// Create a controller driving `engine`.
    pub fn with_engine(engine: E, config: PlayerConfig) -> Self {
        let mut controller = Self::new(config);
        controller.attach_engine(engine);
        controller
    }

    /// Swap in a new engine, returning the previous one.
    ///
    /// Anything in flight on the old engine is abandoned and the session goes
    /// back to `Idle`. Signal subscribers must re-bind to the new engine.
    pub fn attach_engine(&mut self, mut engine: E) -> Option<E> {
        if let Err(e) = engine.set_volume(self.session.volume.get()) {
            warn!("Failed to apply volume to new engine: {e}");
        }
        let previous = self.detach_engine();
        self.engine = Some(engine);
        previous
    }

    /// Remove the engine, leaving the session idle.
    pub fn detach_engine(&mut self) -> Option<E> {
        self.invalidate_attempt();
        self.session.is_playing = false;
        self.session.state = PlayerState::Idle;
        self.session.reset_timeline();
        self.engine.take()
    }

    pub const fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    pub const fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub const fn state(&self) -> PlayerState {
        self.session.state
    }

    pub const fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.session.current_track()
    }

    /// Replace the queue and start playing its current track.
    ///
    /// An empty `queue` with a `track` plays that track as a one-entry queue.
    /// Otherwise `queue[index]` is what gets loaded. Fails only with
    /// [`Error::InvalidIndex`], in which case nothing changes.
    pub fn play(
        &mut self,
        track: Option<Track>,
        queue: Vec<Track>,
        cover_art: Option<String>,
        index: usize,
    ) -> Result<()> {
        let queue = if queue.is_empty() {
            Queue::from_tracks(track.iter().cloned().collect(), 0)?
        } else {
            Queue::from_tracks(queue, index)?
        };

        self.session.cover_art_uri = cover_art;
        self.session.is_visible = true;
        self.session.is_playing = true;
        self.session.queue = queue;

        let Some(track) = track else {
            debug!("Play called without a track");
            self.settle_idle();
            return Ok(());
        };
        if let Some(current) = self.session.current_track() {
            if current.source_uri != track.source_uri {
                warn!(
                    "Requested track '{}' differs from queue entry '{}', playing the queue entry",
                    track.name, current.name
                );
            }
        }

        self.load_current();
        Ok(())
    }

    /// Pause playback. Ignored unless playing or starting.
    pub fn pause(&mut self) {
        if !matches!(
            self.session.state,
            PlayerState::Playing | PlayerState::Loading | PlayerState::AwaitingData
        ) {
            debug!("Pause ignored in {:?}", self.session.state);
            return;
        }

        self.invalidate_attempt();
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.stop() {
                warn!("Engine failed to stop: {e}");
            }
        }
        self.session.state = PlayerState::Paused;
        self.session.is_playing = false;
        info!("Playback paused");
    }

    /// Pause when playing, otherwise (re)start the current track.
    pub fn toggle_play_pause(&mut self) {
        if self.session.is_playing {
            self.pause();
            return;
        }
        if self.session.current_track().is_none() {
            debug!("Nothing to play");
            return;
        }

        self.session.is_playing = true;
        if self.session.state == PlayerState::Idle {
            self.load_current();
            return;
        }

        let attempt = self.begin_attempt();
        let Some(engine) = self.engine.as_mut() else {
            self.engine_missing();
            return;
        };
        self.session.state = PlayerState::Loading;
        let outcome = engine.start(attempt);
        self.apply_start_outcome(attempt, outcome, StartPhase::First);
    }

    /// Advance to the next track, wrapping around, and play it.
    pub fn next(&mut self) -> Result<()> {
        let name = self.session.queue.advance()?.name.clone();
        info!("Next track: {name}");
        self.session.is_playing = true;
        self.load_current();
        Ok(())
    }

    /// Go back to the previous track, wrapping around, and play it.
    pub fn previous(&mut self) -> Result<()> {
        let name = self.session.queue.retreat()?.name.clone();
        info!("Previous track: {name}");
        self.session.is_playing = true;
        self.load_current();
        Ok(())
    }

    /// Move the playhead, clamped to `[0, duration]` when the duration is known.
    ///
    /// `current_time` is read back from the engine afterwards.
    pub fn seek(&mut self, target_seconds: f64) {
        if !target_seconds.is_finite() {
            debug!("Ignoring seek to {target_seconds}");
            return;
        }
        if self.session.state == PlayerState::Idle {
            debug!("Seek ignored: no track loaded");
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let mut target = target_seconds.max(0.0);
        if let Some(duration) = self.session.duration {
            target = target.min(duration);
        }
        if let Err(e) = engine.set_position(target) {
            warn!("Seek to {target:.2}s failed: {e}");
            return;
        }
        self.session.current_time = engine.position();
    }

    /// Set the volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, level: f32) {
        let volume = Volume::new(level);
        self.session.volume = volume;
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.set_volume(volume.get()) {
                warn!("Engine rejected volume {}: {e}", volume.get());
            }
        }
    }

    pub fn set_minimized(&mut self, minimized: bool) {
        self.session.is_minimized = minimized;
    }

    pub fn toggle_minimized(&mut self) -> bool {
        self.session.is_minimized = !self.session.is_minimized;
        self.session.is_minimized
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.session.is_visible = visible;
    }

    /// Feed one engine signal into the state machine.
    ///
    /// Signals for any source other than the current one are dropped.
    pub fn handle_signal(&mut self, signal: EngineSignal) {
        let current = match (self.session.state, self.session.current_track()) {
            (PlayerState::Idle, _) | (_, None) => None,
            (_, Some(track)) => Some(track.source_uri.as_str()),
        };
        if current != Some(signal.uri()) {
            debug!("Dropping signal for inactive source: {:?}", signal);
            return;
        }

        // Ticks and ends can only belong to an earlier start of the same source
        if self.session.state.is_starting()
            && matches!(
                signal,
                EngineSignal::TimeUpdated { .. } | EngineSignal::Ended { .. }
            )
        {
            debug!("Dropping signal while starting: {:?}", signal);
            return;
        }

        match signal {
            EngineSignal::TimeUpdated { seconds, .. } => {
                if seconds.is_finite() {
                    self.session.current_time = seconds.max(0.0);
                }
            }
            EngineSignal::MetadataReady { duration, .. } => {
                if duration.is_finite() && duration >= 0.0 {
                    self.session.duration = Some(duration);
                }
            }
            EngineSignal::DataLoaded { .. } => self.on_data_loaded(),
            EngineSignal::Ended { .. } => self.on_ended(),
            EngineSignal::StartResolved {
                attempt, result, ..
            } => self.on_start_resolved(attempt, result),
            EngineSignal::Error { message, .. } => {
                error!("Media error: {message}");
                self.fail_start(Error::Engine(message));
            }
        }
    }

    /// Stop the engine and abandon anything in flight.
    pub fn shutdown(&mut self) {
        self.invalidate_attempt();
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.stop() {
                warn!("Engine failed to stop on shutdown: {e}");
            }
        }
        self.session.is_playing = false;
        if self.session.state != PlayerState::Idle {
            self.session.state = PlayerState::Paused;
        }
        info!("Playback controller shut down");
    }

    /// Load the queue's current track into the engine and try to start it.
    fn load_current(&mut self) {
        let attempt = self.begin_attempt();
        self.session.reset_timeline();
        self.session.last_failure = None;

        let Some(track) = self.session.queue.current().cloned() else {
            self.settle_idle();
            return;
        };
        let Some(engine) = self.engine.as_mut() else {
            self.engine_missing();
            return;
        };

        info!("Loading {} - {}", track.name, track.artist_display());
        let loaded = engine
            .stop()
            .and_then(|()| engine.set_position(0.0))
            .and_then(|()| engine.load(&track.source_uri));
        if let Err(e) = loaded {
            error!("Failed to load {}: {e}", track.source_uri);
            self.session.is_playing = false;
            self.session.state = PlayerState::Idle;
            self.session.last_failure = Some(e.to_string());
            return;
        }

        self.session.state = PlayerState::Loading;
        self.session.is_playing = true;
        let outcome = engine.start(attempt);
        self.apply_start_outcome(attempt, outcome, StartPhase::First);
    }

    fn apply_start_outcome(&mut self, attempt: AttemptId, outcome: StartOutcome, phase: StartPhase) {
        match outcome {
            StartOutcome::Started => self.mark_playing(),
            StartOutcome::Pending => {
                debug!("Start {attempt:?} pending");
                self.session.state = PlayerState::Loading;
                self.pending = Some(PendingStart { attempt, phase });
            }
            StartOutcome::Rejected(reason) => self.on_rejected(attempt, reason, phase),
        }
    }

    fn on_rejected(&mut self, attempt: AttemptId, reason: String, phase: StartPhase) {
        let err = if phase == StartPhase::First && self.config.retry_on_data_loaded {
            Error::StartRejected(reason)
        } else {
            Error::StartFailedTerminal(reason)
        };
        if !err.is_recoverable() {
            self.fail_start(err);
            return;
        }

        warn!("{err}; retrying when data is loaded");
        self.pending = None;
        self.retry_armed = Some(attempt);
        self.session.state = PlayerState::AwaitingData;
    }

    fn on_start_resolved(&mut self, attempt: AttemptId, result: std::result::Result<(), String>) {
        let pending = match self.pending {
            Some(pending) if pending.attempt == attempt => pending,
            _ => {
                debug!("Ignoring stale start resolution {attempt:?}");
                return;
            }
        };
        self.pending = None;

        match result {
            Ok(()) => self.mark_playing(),
            Err(reason) => self.on_rejected(attempt, reason, pending.phase),
        }
    }

    fn on_data_loaded(&mut self) {
        if self.retry_armed != Some(self.attempt) {
            debug!("Data loaded, no retry armed");
            return;
        }
        self.retry_armed = None;

        let attempt = self.begin_attempt();
        let Some(engine) = self.engine.as_mut() else {
            self.engine_missing();
            return;
        };
        info!("Data loaded, retrying start");
        self.session.state = PlayerState::Loading;
        let outcome = engine.start(attempt);
        self.apply_start_outcome(attempt, outcome, StartPhase::Retry);
    }

    fn on_ended(&mut self) {
        self.invalidate_attempt();
        self.session.state = PlayerState::Ended;
        info!("Track ended");
        if let Err(e) = self.next() {
            warn!("Cannot advance after end: {e}");
            self.session.is_playing = false;
            self.session.state = PlayerState::Idle;
        }
    }

    fn mark_playing(&mut self) {
        self.pending = None;
        self.retry_armed = None;
        self.session.state = PlayerState::Playing;
        self.session.is_playing = true;
        self.session.last_failure = None;
        if let Some(track) = self.session.current_track() {
            info!("Playing {}", track.name);
        }
    }

    /// End the current attempt for good. The source stays loaded.
    fn fail_start(&mut self, err: Error) {
        error!("{err}");
        self.invalidate_attempt();
        self.session.is_playing = false;
        self.session.state = PlayerState::Paused;
        self.session.last_failure = Some(err.to_string());
    }

    /// Nothing can play: fall back to idle.
    fn settle_idle(&mut self) {
        self.invalidate_attempt();
        self.session.is_playing = false;
        self.session.state = PlayerState::Idle;
    }

    fn engine_missing(&mut self) {
        let err = Error::EngineUnavailable;
        warn!("{err}");
        self.settle_idle();
        self.session.last_failure = Some(err.to_string());
    }

    /// Start a new attempt, superseding whatever was in flight.
    fn begin_attempt(&mut self) -> AttemptId {
        self.invalidate_attempt();
        self.attempt
    }

    fn invalidate_attempt(&mut self) {
        self.attempt = self.attempt.next();
        self.pending = None;
        self.retry_armed = None;
    }
}

impl<E: EngineAdapter> Default for PlaybackController<E> {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}
