//! # cadence-player
//!
//! The "now playing" session: a [`PlaybackController`] that drives one
//! playback engine over a queue of tracks, and a [`Synchronizer`] that feeds
//! the engine's signals back into it.
//!
//! Starting playback may not succeed right away. When the engine rejects a
//! start, the controller waits for the engine's data-loaded signal and tries
//! exactly once more. Every start carries an attempt id, so resolutions that
//! belong to a superseded attempt are ignored.

pub mod config;
pub mod controller;
pub mod session;
pub mod sync;

pub use config::PlayerConfig;
pub use controller::PlaybackController;
pub use session::{PlaybackSession, PlayerState};
pub use sync::Synchronizer;
