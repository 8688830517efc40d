//! Commands accepted by the playback controller.

use crate::{
    library::{Playlist, Track},
    state::PlayMode,
};

/// A request to change playback.
///
/// Commands are applied one at a time, in the order they reach the
/// controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the playlist and load the track at `start_index`, stopped.
    Load { playlist: Playlist, start_index: usize },
    /// Start or resume playback of the loaded track.
    Play,
    /// Pause the playing track.
    Pause,
    /// Pause when playing, resume when paused.
    TogglePause,
    /// Stop playback and rewind.
    Stop,
    /// Advance according to the play mode.
    Next,
    /// Step back according to the play mode.
    Previous,
    /// Load and play the track at the given playlist index.
    JumpTo(usize),
    /// Move the playback position (milliseconds).
    Seek(u64),
    /// Set output volume (0-100).
    SetVolume(u8),
    /// Change how the next track is chosen.
    SetMode(PlayMode),
    /// Append tracks to the playlist.
    AddTracks(Vec<Track>),
    /// Remove the track at the given index.
    RemoveTrack(usize),
    /// Stop and empty the playlist.
    ClearPlaylist,
}

impl Command {
    /// Short lowercase name used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::TogglePause => "toggle pause",
            Self::Stop => "stop",
            Self::Next => "skip to next",
            Self::Previous => "skip to previous",
            Self::JumpTo(_) => "jump",
            Self::Seek(_) => "seek",
            Self::SetVolume(_) => "set volume",
            Self::SetMode(_) => "set mode",
            Self::AddTracks(_) => "add tracks",
            Self::RemoveTrack(_) => "remove track",
            Self::ClearPlaylist => "clear playlist",
        }
    }

    /// Whether this command supersedes a track load still in flight.
    #[must_use]
    pub fn cancels_load(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Stop | Self::ClearPlaylist)
    }
}
