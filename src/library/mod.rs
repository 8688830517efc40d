//! Playlists and their persistence.
//!
//! This module provides the in-memory playlist model and the SQLite store
//! for named playlists and favourites.

pub mod autosave;
pub mod database;
pub mod models;
pub mod schema;

pub use {
    autosave::autosave_playlist,
    database::{LibraryError, PlaylistStore, is_valid_playlist_name},
    models::{Playlist, Track},
    schema::{CURRENT_SCHEMA_VERSION, SchemaError, SchemaManager, create_connection_pool},
};
