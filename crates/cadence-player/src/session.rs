//! Observable state of the playback session.

use cadence_core::{Queue, Track, Volume};
use serde::Serialize;

/// Where the controller is in the playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// No source loaded.
    #[default]
    Idle,
    /// Source assigned and start requested, outcome unknown.
    Loading,
    Playing,
    Paused,
    /// Start was rejected; waiting for the engine's data-loaded signal.
    AwaitingData,
    /// The engine finished the current source.
    Ended,
}

impl PlayerState {
    /// Whether a start request is unresolved.
    pub const fn is_starting(self) -> bool {
        matches!(self, Self::Loading | Self::AwaitingData)
    }
}

/// Everything a presentation layer reads about the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    pub(crate) queue: Queue,
    pub(crate) state: PlayerState,
    pub(crate) is_playing: bool,
    pub(crate) current_time: f64,
    pub(crate) duration: Option<f64>,
    pub(crate) volume: Volume,
    pub(crate) is_visible: bool,
    pub(crate) is_minimized: bool,
    pub(crate) cover_art_uri: Option<String>,
    pub(crate) last_failure: Option<String>,
}

impl PlaybackSession {
    pub fn new(volume: Volume) -> Self {
        Self {
            queue: Queue::new(),
            state: PlayerState::Idle,
            is_playing: false,
            current_time: 0.0,
            duration: None,
            volume,
            is_visible: false,
            is_minimized: false,
            cover_art_uri: None,
            last_failure: None,
        }
    }

    pub const fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    pub const fn state(&self) -> PlayerState {
        self.state
    }

    pub const fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Playhead in seconds.
    pub const fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Media length in seconds, once the engine has reported it.
    pub const fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub const fn volume(&self) -> Volume {
        self.volume
    }

    pub const fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub const fn is_minimized(&self) -> bool {
        self.is_minimized
    }

    pub fn cover_art_uri(&self) -> Option<&str> {
        self.cover_art_uri.as_deref()
    }

    /// Message of the last start that failed for good.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Fraction of the track played, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => (self.current_time / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Forget everything about the previous source.
    pub(crate) fn reset_timeline(&mut self) {
        self.current_time = 0.0;
        self.duration = None;
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(Volume::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_session_defaults() {
        let session = PlaybackSession::default();
        assert_eq!(session.state(), PlayerState::Idle);
        assert!(!session.is_playing());
        assert!(!session.is_visible());
        assert!(!session.is_minimized());
        assert!(session.current_track().is_none());
        assert!((session.volume().get() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_progress() {
        let mut session = PlaybackSession::default();
        assert!(session.progress().abs() < f64::EPSILON);

        session.duration = Some(200.0);
        session.current_time = 50.0;
        assert!((session.progress() - 0.25).abs() < f64::EPSILON);

        session.current_time = 500.0;
        assert!((session.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_starting_states() {
        assert!(PlayerState::Loading.is_starting());
        assert!(PlayerState::AwaitingData.is_starting());
        assert!(!PlayerState::Playing.is_starting());
    }

    #[test]
    fn test_session_serializes_for_presentation() {
        let mut session = PlaybackSession::default();
        session.state = PlayerState::AwaitingData;
        session.is_playing = true;

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["state"], "awaiting_data");
        assert_eq!(json["is_playing"], true);
        assert_eq!(json["volume"], 0.5);
        assert!(json["duration"].is_null());
    }
}
