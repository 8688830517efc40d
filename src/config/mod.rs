//! User preferences and persistent settings.
//!
//! This module provides user preference management with XDG Base Directory
//! compliance.

pub mod settings;

pub use settings::{
    SettingsError, SettingsManager, UserSettings, get_config_path, get_database_path,
    persist_preferences,
};
