//! Events published by the playback controller.

use crate::{
    error::ErrorKind,
    library::Playlist,
    state::playback::{PlayMode, PlaybackState},
};

/// Notification delivered to every `ObserverHub` subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Playback state changed. `old` and `new` always differ.
    StateChanged {
        old: PlaybackState,
        new: PlaybackState,
    },
    /// Playback position advanced (milliseconds).
    PositionTick(u64),
    /// The playlist or the cursor within it changed. Carries a snapshot.
    PlaylistChanged {
        playlist: Playlist,
        cursor: Option<usize>,
    },
    /// Output volume changed (0-100).
    VolumeChanged(u8),
    /// Play mode changed.
    ModeChanged(PlayMode),
    /// A failure observers should surface.
    Error { kind: ErrorKind, detail: String },
}

impl PlaybackEvent {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state-changed",
            Self::PositionTick(_) => "position-tick",
            Self::PlaylistChanged { .. } => "playlist-changed",
            Self::VolumeChanged(_) => "volume-changed",
            Self::ModeChanged(_) => "mode-changed",
            Self::Error { .. } => "error",
        }
    }
}
