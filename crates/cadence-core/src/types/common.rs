//! Common types shared across the application.

use serde::{Deserialize, Serialize};

/// Output volume in `[0.0, 1.0]`.
///
/// Construction always clamps, so a `Volume` never holds an out-of-range
/// value. `NaN` maps to silence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(from = "f32", into = "f32")]
pub struct Volume(f32);

impl Volume {
    pub const MIN: Self = Self(0.0);
    pub const MAX: Self = Self(1.0);

    pub fn new(level: f32) -> Self {
        if level.is_nan() {
            Self::MIN
        } else {
            Self(level.clamp(0.0, 1.0))
        }
    }

    pub const fn get(self) -> f32 {
        self.0
    }

    pub fn is_muted(self) -> bool {
        self.0 <= 0.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(0.5)
    }
}

impl From<f32> for Volume {
    fn from(level: f32) -> Self {
        Self::new(level)
    }
}

impl From<Volume> for f32 {
    fn from(v: Volume) -> Self {
        v.0
    }
}
