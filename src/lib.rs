//! Cadenza - playback coordination core for a desktop music player.
//!
//! Cadenza owns the playlist, the play mode and the playback state machine,
//! drives an audio engine through the `PlaybackEngine` trait, and notifies
//! observers of every change. Playlists and favourites persist in SQLite;
//! preferences persist as XDG JSON settings.

pub mod audio;
pub mod config;
pub mod console;
pub mod error;
pub mod library;
pub mod logging;
pub mod state;

// Re-export key types for convenience
pub use {
    audio::{
        Command, ControllerConfig, ControllerSnapshot, EngineNotification, PlaybackController,
        PlaybackEngine, SimulatedEngine, TagReader,
    },
    config::{SettingsManager, UserSettings},
    error::{EngineError, ErrorKind, LibraryError, PlaybackError},
    library::{Playlist, PlaylistStore, Track},
    state::{ObserverHub, PlayMode, PlaybackEvent, PlaybackState, Subscription},
};
