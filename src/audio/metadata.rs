//! Track metadata extraction using the `lofty` crate.
//!
//! Only what the playlist needs is read: title, artist and duration.
//! Files with missing or unreadable tags fall back to their file name.

use std::path::Path;

use {
    lofty::{
        error::LoftyError,
        prelude::{AudioFile, TaggedFileExt},
        probe::Probe,
        tag::Accessor,
    },
    serde::{Deserialize, Serialize},
    thiserror::Error,
    tracing::warn,
};

use crate::library::models::{Track, file_stem_title};

/// Artist shown when a file carries no artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Error type for metadata extraction operations.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Failed to read or parse the audio file.
    #[error("Failed to read audio file: {0}")]
    ReadError(#[from] LoftyError),
}

/// Tag information for one audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Track title, or the file stem when untagged.
    pub title: String,
    /// Track artist, or `UNKNOWN_ARTIST`.
    pub artist: String,
    /// Duration in milliseconds, if the container reports one.
    pub duration_ms: Option<u64>,
}

impl TrackMetadata {
    /// Metadata derived from the path alone.
    pub fn fallback<P: AsRef<Path>>(path: P) -> Self {
        Self {
            title: file_stem_title(path.as_ref()),
            artist: UNKNOWN_ARTIST.to_string(),
            duration_ms: None,
        }
    }
}

/// Reads tags from audio files.
///
/// # Examples
///
/// ```no_run
/// use cadenza::audio::metadata::TagReader;
///
/// let track = TagReader::read_track_or_fallback("/music/song.flac");
/// println!("{} ({:?} ms)", track.title, track.duration_ms);
/// ```
pub struct TagReader;

impl TagReader {
    /// Reads title, artist and duration from an audio file.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if the file cannot be opened or parsed.
    pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<TrackMetadata, MetadataError> {
        let path = path.as_ref();
        let tagged_file = Probe::open(path)?.read()?;

        let primary_tag = tagged_file.primary_tag();
        let duration_ms = u64::try_from(tagged_file.properties().duration().as_millis())
            .unwrap_or(u64::MAX);

        Ok(TrackMetadata {
            title: primary_tag
                .and_then(|tag| tag.title().map(|s| s.to_string()))
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| file_stem_title(path)),
            artist: primary_tag
                .and_then(|tag| tag.artist().map(|s| s.to_string()))
                .filter(|artist| !artist.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            duration_ms: (duration_ms > 0).then_some(duration_ms),
        })
    }

    /// Reads the duration of an audio file in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` if the file cannot be opened or parsed.
    pub fn read_duration_ms<P: AsRef<Path>>(path: P) -> Result<Option<u64>, MetadataError> {
        Ok(Self::read_metadata(path)?.duration_ms)
    }

    /// Builds a playlist entry for `path`, degrading to file-name metadata
    /// when the tags cannot be read.
    pub fn read_track_or_fallback<P: AsRef<Path>>(path: P) -> Track {
        let path = path.as_ref();
        let metadata = Self::read_metadata(path).unwrap_or_else(|e| {
            warn!("Using file name for {}: {e}", path.display());
            TrackMetadata::fallback(path)
        });
        Track::new(path.to_string_lossy(), metadata.title, metadata.duration_ms)
    }
}
