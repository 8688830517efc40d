//! The audio backend seam.
//!
//! The playback core never decodes audio itself. It drives an implementation
//! of `PlaybackEngine` and consumes the notifications the engine emits.

use std::path::Path;

use {async_channel::Receiver, async_trait::async_trait};

use crate::error::EngineError;

/// Asynchronous notification emitted by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineNotification {
    /// Playback position in milliseconds.
    PositionTick(u64),
    /// The loaded track played to its end.
    EndOfTrack,
    /// The backend failed while playing.
    Error(String),
}

/// Audio backend driven by the playback controller.
///
/// Everything except `load` is a dispatch: it returns once the request has
/// been handed to the backend, not once playback physically reflects it.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Opens `path`, replacing whatever was loaded, and leaves it stopped at
    /// position zero.
    ///
    /// Returns the track duration in milliseconds when the backend knows it.
    /// May take a while; the caller may drop the future to abandon the load.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Load` if the track cannot be opened.
    async fn load(&self, path: &Path) -> Result<Option<u64>, EngineError>;

    /// Starts or resumes playback of the loaded track.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the backend rejects the request.
    fn play(&self) -> Result<(), EngineError>;

    /// Pauses playback, keeping the position.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the backend rejects the request.
    fn pause(&self) -> Result<(), EngineError>;

    /// Stops playback and rewinds to zero. The track stays loaded.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the backend rejects the request.
    fn stop(&self) -> Result<(), EngineError>;

    /// Moves the playback position to `position_ms`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the backend rejects the request.
    fn seek(&self, position_ms: u64) -> Result<(), EngineError>;

    /// Sets output volume, 0-100.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the backend rejects the request.
    fn set_volume(&self, level: u8) -> Result<(), EngineError>;

    /// Stream of engine notifications.
    ///
    /// Receivers share one queue; each notification is delivered once.
    fn notifications(&self) -> Receiver<EngineNotification>;
}
