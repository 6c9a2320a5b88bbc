//! Media backends used by the threaded engine.

use std::time::Duration;

use cadence_core::{Error, Result};
use tracing::debug;
use url::Url;

/// What a backend knows about a source once it has opened it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// Total length in seconds.
    pub duration: f64,
    /// Time until enough data is buffered to start playback.
    pub load_latency: Duration,
}

/// Opens media sources for the engine worker.
pub trait MediaBackend: Send + 'static {
    fn open(&mut self, uri: &str) -> Result<MediaInfo>;
}

/// Backend for `sim://` sources that produce no audio.
///
/// Query parameters:
/// - `duration`: length in seconds (default 180)
/// - `load_ms`: buffering latency in milliseconds (default 0)
/// - `fail`: if present and not `0`/`false`, opening fails
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedBackend;

impl SimulatedBackend {
    const SCHEME: &'static str = "sim";
    const DEFAULT_DURATION: f64 = 180.0;
}

impl MediaBackend for SimulatedBackend {
    fn open(&mut self, uri: &str) -> Result<MediaInfo> {
        let url = Url::parse(uri).map_err(|e| Error::InvalidMedia(format!("{uri}: {e}")))?;
        if url.scheme() != Self::SCHEME {
            return Err(Error::InvalidMedia(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let mut info = MediaInfo {
            duration: Self::DEFAULT_DURATION,
            load_latency: Duration::ZERO,
        };

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "duration" => {
                    info.duration = value
                        .parse::<f64>()
                        .ok()
                        .filter(|d| d.is_finite() && *d >= 0.0)
                        .ok_or_else(|| Error::InvalidMedia(format!("bad duration '{value}'")))?;
                }
                "load_ms" => {
                    let ms = value
                        .parse::<u64>()
                        .map_err(|_| Error::InvalidMedia(format!("bad load_ms '{value}'")))?;
                    info.load_latency = Duration::from_millis(ms);
                }
                "fail" if value != "0" && value != "false" => {
                    return Err(Error::InvalidMedia(format!("{uri}: media failed to load")));
                }
                _ => {}
            }
        }

        debug!("Opened simulated media {uri}: {:?}", info);
        Ok(info)
    }
}
