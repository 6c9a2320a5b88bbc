//! Deterministic engine whose behaviour is scripted by the caller.

use std::collections::VecDeque;

use cadence_core::{Error, Result};
use crossbeam_channel::Receiver;

use crate::adapter::{AttemptId, EngineAdapter, EngineSignal, StartOutcome};
use crate::signals::SignalHub;

/// A call received by a [`ScriptedEngine`].
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(String),
    Start(AttemptId),
    Stop,
    SetPosition(f64),
    SetVolume(f32),
}

/// Engine that records every call and answers `start` from a script.
///
/// Start outcomes are taken from a queue, falling back to `Started` once it
/// runs dry. Signals are only ever emitted by the caller.
#[derive(Default)]
pub struct ScriptedEngine {
    hub: SignalHub,
    calls: Vec<EngineCall>,
    outcomes: VecDeque<StartOutcome>,
    failing_loads: usize,
    source: Option<String>,
    position: f64,
    volume: f32,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for upcoming `start` calls.
    #[must_use]
    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = StartOutcome>) -> Self {
        self.outcomes.extend(outcomes);
        self
    }

    pub fn push_outcome(&mut self, outcome: StartOutcome) {
        self.outcomes.push_back(outcome);
    }

    /// Make the next `count` loads fail.
    pub fn fail_loads(&mut self, count: usize) {
        self.failing_loads = count;
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Attempts passed to `start`, oldest first.
    pub fn start_attempts(&self) -> Vec<AttemptId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Start(attempt) => Some(*attempt),
                _ => None,
            })
            .collect()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub const fn volume(&self) -> f32 {
        self.volume
    }

    /// Emit a signal to all subscribers.
    pub fn emit(&self, signal: EngineSignal) {
        self.hub.emit(signal);
    }

    /// Emit `DataLoaded` for the current source.
    pub fn emit_data_loaded(&self) {
        self.emit(EngineSignal::DataLoaded {
            uri: self.source_or_empty(),
        });
    }

    /// Emit `Ended` for the current source.
    pub fn emit_ended(&self) {
        self.emit(EngineSignal::Ended {
            uri: self.source_or_empty(),
        });
    }

    fn source_or_empty(&self) -> String {
        self.source.clone().unwrap_or_default()
    }
}

impl EngineAdapter for ScriptedEngine {
    fn load(&mut self, uri: &str) -> Result<()> {
        self.calls.push(EngineCall::Load(uri.to_string()));
        if self.failing_loads > 0 {
            self.failing_loads -= 1;
            return Err(Error::Engine(format!("scripted load failure for {uri}")));
        }
        self.source = Some(uri.to_string());
        self.position = 0.0;
        Ok(())
    }

    fn start(&mut self, attempt: AttemptId) -> StartOutcome {
        self.calls.push(EngineCall::Start(attempt));
        self.outcomes.pop_front().unwrap_or(StartOutcome::Started)
    }

    fn stop(&mut self) -> Result<()> {
        self.calls.push(EngineCall::Stop);
        Ok(())
    }

    fn set_position(&mut self, seconds: f64) -> Result<()> {
        self.calls.push(EngineCall::SetPosition(seconds));
        self.position = seconds;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn set_volume(&mut self, level: f32) -> Result<()> {
        self.calls.push(EngineCall::SetVolume(level));
        self.volume = level;
        Ok(())
    }

    fn subscribe(&self) -> Receiver<EngineSignal> {
        self.hub.subscribe()
    }
}
