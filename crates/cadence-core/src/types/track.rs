//! Track type representing a single playable media item.

use serde::{Deserialize, Serialize};

/// A single playable track.
///
/// Tracks are supplied by the caller as part of a queue and are never mutated
/// by the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Caller-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Artist display name.
    #[serde(default)]
    pub artist: String,
    /// Media locator handed to the playback engine.
    pub source_uri: String,
    /// Cover art locator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art_uri: Option<String>,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source_uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: String::new(),
            source_uri: source_uri.into(),
            cover_art_uri: None,
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    #[must_use]
    pub fn with_cover_art(mut self, uri: impl Into<String>) -> Self {
        self.cover_art_uri = Some(uri.into());
        self
    }

    /// Artist name, or a placeholder when unknown.
    pub fn artist_display(&self) -> &str {
        if self.artist.is_empty() {
            "Unknown Artist"
        } else {
            &self.artist
        }
    }
}
