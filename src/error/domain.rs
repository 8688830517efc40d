//! Domain-specific error types using `thiserror`.
//!
//! This module defines the error enums for the playback core: command
//! failures returned to the issuer, backend failures reported by the
//! engine, and the kind tags carried by published error events.

use std::result::Result as StdResult;

use {
    anyhow::Error,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

/// Failure reported by a playback engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The backend could not open or prepare a track.
    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },
    /// Any other backend failure.
    #[error("Engine failure: {reason}")]
    Backend { reason: String },
}

impl EngineError {
    /// Creates a new `Load` error.
    pub fn load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Backend` error.
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// Errors returned synchronously to the issuer of a playback command.
///
/// Every variant leaves controller state exactly as it was before the
/// command was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The command is not valid in the current playback state.
    #[error("Cannot {command} while {state}")]
    InvalidTransition {
        command: &'static str,
        state: &'static str,
    },
    /// A playlist index outside the current playlist.
    #[error("Index {index} is out of range for a playlist of {len} tracks")]
    InvalidIndex { index: usize, len: usize },
    /// A numeric argument outside its accepted range.
    #[error("Value {value} is out of range (maximum {max})")]
    OutOfRange { value: u64, max: u64 },
    /// Play was requested with nothing loaded.
    #[error("No track loaded")]
    NoTrackLoaded,
    /// The engine failed to load a track.
    #[error("Load error: {0}")]
    Load(EngineError),
    /// The engine rejected a dispatched call.
    #[error("Engine error: {0}")]
    Engine(EngineError),
    /// An in-flight load was superseded by a later Load or Stop.
    #[error("Load was cancelled by a later command")]
    Cancelled,
    /// The controller task is no longer running.
    #[error("Playback controller has shut down")]
    Shutdown,
}

impl PlaybackError {
    /// Returns the kind tag used when this error is published to observers.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::InvalidIndex { .. } => ErrorKind::InvalidIndex,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::NoTrackLoaded => ErrorKind::NoTrackLoaded,
            Self::Load(_) => ErrorKind::Load,
            Self::Engine(_) | Self::Cancelled | Self::Shutdown => ErrorKind::Engine,
        }
    }
}

/// Kind tag carried by `PlaybackEvent::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Command not valid in the current state.
    InvalidTransition,
    /// Bad playlist index.
    InvalidIndex,
    /// Bad numeric argument.
    OutOfRange,
    /// Nothing loaded.
    NoTrackLoaded,
    /// Track could not be loaded.
    Load,
    /// Backend failure.
    Engine,
}

/// Operational error context propagation with `anyhow`.
///
/// This type is used at the binary boundary where errors only need
/// rich context, not specific handling.
pub type Result<T> = StdResult<T, Error>;
