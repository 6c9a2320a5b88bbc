//! Queue management types.

use serde::{Deserialize, Serialize};

use super::Track;
use crate::error::{Error, Result};

/// The playback queue.
///
/// An ordered list of tracks plus a cursor. The cursor is `Some` exactly when
/// the queue is non-empty, and always points inside the list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Queue {
    /// All tracks in the queue.
    tracks: Vec<Track>,
    /// Current playback index.
    current_index: Option<usize>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue positioned at `index`.
    pub fn from_tracks(tracks: Vec<Track>, index: usize) -> Result<Self> {
        let mut queue = Self::new();
        queue.replace(tracks, index)?;
        Ok(queue)
    }

    /// Get all tracks in the queue.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Get the current track.
    pub fn current(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    /// Get the current index.
    pub const fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Get the number of tracks in the queue.
    pub const fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the queue is empty.
    pub const fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Replace the queue contents and position in one step.
    ///
    /// An empty list is accepted and leaves no current track. For a non-empty
    /// list, `index` must be in range; on error the queue is left untouched.
    pub fn replace(&mut self, tracks: Vec<Track>, index: usize) -> Result<()> {
        if tracks.is_empty() {
            self.clear();
            return Ok(());
        }

        if index >= tracks.len() {
            return Err(Error::InvalidIndex {
                index,
                len: tracks.len(),
            });
        }

        self.tracks = tracks;
        self.current_index = Some(index);
        Ok(())
    }

    /// Clear the entire queue.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = None;
    }

    /// Move to the next track, wrapping to the start.
    pub fn advance(&mut self) -> Result<&Track> {
        let len = self.non_empty_len()?;
        let current = self.current_index.unwrap_or(0);
        self.jump((current + 1) % len)
    }

    /// Move to the previous track, wrapping to the end.
    pub fn retreat(&mut self) -> Result<&Track> {
        let len = self.non_empty_len()?;
        let current = self.current_index.unwrap_or(0);
        self.jump((current + len - 1) % len)
    }

    fn non_empty_len(&self) -> Result<usize> {
        if self.tracks.is_empty() {
            Err(Error::EmptyQueue)
        } else {
            Ok(self.tracks.len())
        }
    }

    fn jump(&mut self, index: usize) -> Result<&Track> {
        self.current_index = Some(index);
        self.tracks.get(index).ok_or(Error::InvalidIndex {
            index,
            len: self.tracks.len(),
        })
    }
}
