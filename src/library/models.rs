//! Data models exchanged between the playback core and persistence.
//!
//! `Track` values are immutable once created and a `Playlist` is always
//! handed around as an owned snapshot.

use std::{ops::Index, path::Path, slice::Iter};

use serde::{Deserialize, Serialize};

/// A playable track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// File system path to the audio file.
    pub path: String,
    /// Display title.
    pub title: String,
    /// Duration in milliseconds, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Track {
    /// Creates a track from explicit values.
    pub fn new(path: impl Into<String>, title: impl Into<String>, duration_ms: Option<u64>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            duration_ms,
        }
    }

    /// Creates a track titled after the file stem, with unknown duration.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self {
            path: path.to_string_lossy().to_string(),
            title: file_stem_title(path),
            duration_ms: None,
        }
    }

    /// Returns the track path.
    #[must_use]
    pub fn path(&self) -> &Path {
        Path::new(&self.path)
    }
}

/// Title fallback used when tags carry none.
pub(crate) fn file_stem_title(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map_or_else(
            || path.to_string_lossy().to_string(),
            |stem| stem.to_string_lossy().to_string(),
        )
}

/// Ordered sequence of tracks.
///
/// Tracks are identified by position, so the same track may appear more
/// than once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Creates an empty playlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the playlist has no tracks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Iterates over the tracks in order.
    pub fn iter(&self) -> Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Appends tracks to the end.
    pub fn extend<I: IntoIterator<Item = Track>>(&mut self, tracks: I) {
        self.tracks.extend(tracks);
    }

    /// Removes and returns the track at `index`, if it exists.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        (index < self.tracks.len()).then(|| self.tracks.remove(index))
    }

    /// Removes every track.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Consumes the playlist, returning its tracks.
    #[must_use]
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

impl From<Vec<Track>> for Playlist {
    fn from(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

impl FromIterator<Track> for Playlist {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for Playlist {
    type Output = Track;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tracks[index]
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
