//! The contract between the playback controller and a playback engine.

use cadence_core::Result;
use crossbeam_channel::Receiver;

/// Identifies one start attempt.
///
/// The controller hands a fresh id to every [`EngineAdapter::start`] call that
/// belongs to a new attempt. Engines echo it back in
/// [`EngineSignal::StartResolved`] so late resolutions of a superseded attempt
/// can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AttemptId(u64);

impl AttemptId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The id that supersedes this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Immediate result of asking an engine to start playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Playback is running.
    Started,
    /// The engine declined to start right now.
    Rejected(String),
    /// The outcome will arrive later as [`EngineSignal::StartResolved`].
    Pending,
}

/// Signals emitted by an engine.
///
/// Every signal names the source it belongs to, so a receiver can drop
/// signals that were in flight when the source changed.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    /// Playback position advanced (in seconds).
    TimeUpdated { uri: String, seconds: f64 },
    /// Media duration became known (in seconds).
    MetadataReady { uri: String, duration: f64 },
    /// Enough media data is buffered to start playback.
    DataLoaded { uri: String },
    /// Playback reached the end of the media.
    Ended { uri: String },
    /// A [`StartOutcome::Pending`] start resolved.
    StartResolved {
        attempt: AttemptId,
        uri: String,
        result: std::result::Result<(), String>,
    },
    /// The media failed.
    Error { uri: String, message: String },
}

impl EngineSignal {
    /// The source this signal belongs to.
    pub fn uri(&self) -> &str {
        match self {
            Self::TimeUpdated { uri, .. }
            | Self::MetadataReady { uri, .. }
            | Self::DataLoaded { uri }
            | Self::Ended { uri }
            | Self::StartResolved { uri, .. }
            | Self::Error { uri, .. } => uri,
        }
    }
}

/// Capability surface the controller drives.
///
/// Implementations own exactly one media slot: `load` replaces whatever was
/// loaded before. `stop` halts output but keeps the source and its position,
/// so a later `start` resumes.
pub trait EngineAdapter {
    /// Assign a new media source.
    fn load(&mut self, uri: &str) -> Result<()>;

    /// Ask the engine to start or resume playback of the loaded source.
    fn start(&mut self, attempt: AttemptId) -> StartOutcome;

    /// Halt playback, keeping source and position.
    fn stop(&mut self) -> Result<()>;

    /// Move the playhead (in seconds).
    fn set_position(&mut self, seconds: f64) -> Result<()>;

    /// Current playhead as the engine sees it (in seconds).
    fn position(&self) -> f64;

    /// Set output volume in `[0.0, 1.0]`.
    fn set_volume(&mut self, level: f32) -> Result<()>;

    /// Open a new signal subscription.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self) -> Receiver<EngineSignal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_id_ordering() {
        let first = AttemptId::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_signal_uri() {
        let signal = EngineSignal::Ended {
            uri: "sim://a".into(),
        };
        assert_eq!(signal.uri(), "sim://a");
    }

    #[test]
    fn test_attempt_id_wraps() {
        assert_eq!(AttemptId::new(u64::MAX).next(), AttemptId::new(0));
    }
}
