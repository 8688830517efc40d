//! Playback state and play mode values.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Current playback state.
///
/// `track` is an index into the controller's playlist and `position` is in
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing is playing. Position is implicitly zero.
    #[default]
    Stopped,
    /// A track is playing.
    Playing { track: usize, position: u64 },
    /// A track is paused.
    Paused { track: usize, position: u64 },
}

impl PlaybackState {
    /// Index of the active track, if any.
    #[must_use]
    pub fn track(&self) -> Option<usize> {
        match *self {
            Self::Stopped => None,
            Self::Playing { track, .. } | Self::Paused { track, .. } => Some(track),
        }
    }

    /// Playback position in milliseconds (zero when stopped).
    #[must_use]
    pub fn position(&self) -> u64 {
        match *self {
            Self::Stopped => 0,
            Self::Playing { position, .. } | Self::Paused { position, .. } => position,
        }
    }

    /// Whether a track is currently playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    /// Same state with a different position. `Stopped` is unchanged.
    #[must_use]
    pub fn with_position(self, position: u64) -> Self {
        match self {
            Self::Stopped => Self::Stopped,
            Self::Playing { track, .. } => Self::Playing { track, position },
            Self::Paused { track, .. } => Self::Paused { track, position },
        }
    }

    /// Short lowercase name used in error messages and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing { .. } => "playing",
            Self::Paused { .. } => "paused",
        }
    }
}

/// How the next track is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayMode {
    /// Play through the playlist once.
    #[default]
    Sequential,
    /// Repeat the current track.
    LoopSingle,
    /// Play through the playlist and wrap around.
    LoopAll,
    /// Random order, each track once per cycle.
    Shuffle,
}

impl Display for PlayMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Sequential => "sequential",
            Self::LoopSingle => "loop-single",
            Self::LoopAll => "loop-all",
            Self::Shuffle => "shuffle",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PlayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "normal" => Ok(Self::Sequential),
            "loop-single" | "repeat-one" => Ok(Self::LoopSingle),
            "loop-all" | "repeat" => Ok(Self::LoopAll),
            "shuffle" | "random" => Ok(Self::Shuffle),
            other => Err(format!("unknown play mode '{other}'")),
        }
    }
}
