//! Engine tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs for [`ThreadedEngine`](crate::ThreadedEngine).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Interval between `TimeUpdated` signals while playing.
    pub position_interval_ms: u64,
    /// How long the worker blocks on its command channel between ticks.
    pub idle_poll_ms: u64,
}

impl EngineConfig {
    pub const fn position_interval(&self) -> Duration {
        Duration::from_millis(self.position_interval_ms)
    }

    pub const fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            position_interval_ms: 250,
            idle_poll_ms: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"position_interval_ms": 100}"#).unwrap_or_default();
        assert_eq!(config.position_interval(), Duration::from_millis(100));
        assert_eq!(config.idle_poll(), Duration::from_millis(50));
    }
}
