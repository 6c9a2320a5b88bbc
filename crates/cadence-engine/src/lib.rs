//! # cadence-engine
//!
//! The boundary between the playback controller and whatever actually
//! decodes and renders audio.
//!
//! Provides:
//! - The [`EngineAdapter`] contract and the [`EngineSignal`] stream
//! - A fan-out [`SignalHub`] for signal subscribers
//! - [`ThreadedEngine`], a worker-thread engine over a pluggable [`MediaBackend`]
//! - [`ScriptedEngine`], a deterministic engine for tests and previews

pub mod adapter;
pub mod backend;
pub mod config;
pub mod engine;
pub mod scripted;
pub mod signals;

pub use adapter::{AttemptId, EngineAdapter, EngineSignal, StartOutcome};
pub use backend::{MediaBackend, MediaInfo, SimulatedBackend};
pub use config::EngineConfig;
pub use engine::{EngineCommand, PlaybackState, ThreadedEngine};
pub use scripted::{EngineCall, ScriptedEngine};
pub use signals::SignalHub;
