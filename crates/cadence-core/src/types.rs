//! Core domain types for Cadence.

pub mod common;
pub mod queue;
pub mod track;

pub use common::Volume;
pub use queue::Queue;
pub use track::Track;
