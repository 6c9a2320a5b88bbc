//! Player configuration.

use std::time::Duration;

use cadence_core::Volume;
use serde::{Deserialize, Serialize};

/// Settings for a [`PlaybackController`](crate::PlaybackController).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume the session starts with.
    pub initial_volume: Volume,
    /// How often the synchronizer drains engine signals.
    pub sync_interval_ms: u64,
    /// Retry a rejected start once the engine reports data loaded.
    pub retry_on_data_loaded: bool,
}

impl PlayerConfig {
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: Volume::default(),
            sync_interval_ms: 50,
            retry_on_data_loaded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert!((config.initial_volume.get() - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.sync_interval(), Duration::from_millis(50));
        assert!(config.retry_on_data_loaded);
    }

    #[test]
    fn test_partial_json_clamps_volume() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"initial_volume": 4.0, "retry_on_data_loaded": false}"#)
                .unwrap();
        assert!((config.initial_volume.get() - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.sync_interval_ms, 50);
        assert!(!config.retry_on_data_loaded);
    }
}
