//! Error handling built on `thiserror` and `anyhow`.
//!
//! Domain error types give command issuers precise failures; operational
//! helpers add context at the binary boundary.

pub mod domain;
pub mod operational;

pub use {
    crate::{config::SettingsError, library::LibraryError},
    domain::{EngineError, ErrorKind, PlaybackError},
    operational::{ErrorReporter, ResultExt},
};
