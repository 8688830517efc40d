//! User preference management with XDG Base Directory compliance.
//!
//! Settings live in `$XDG_CONFIG_HOME/cadenza/settings.json`; the playlist
//! database defaults to `$XDG_DATA_HOME/cadenza/library.db`.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
    sync::Arc,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::{debug, warn},
};

use crate::{
    audio::navigation::DEFAULT_BACK_STACK_DEPTH,
    state::{ObserverHub, PlayMode, PlaybackEvent, Subscription},
};

/// Application directory name under the XDG base directories.
const APP_DIR: &str = "cadenza";

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
    /// Invalid settings value.
    #[error("Invalid settings value: {reason}")]
    InvalidValue { reason: String },
}

/// Serializable user settings structure with default values.
///
/// Missing keys take their default, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Output volume, 0-100.
    pub volume: u8,
    /// Play mode restored at startup.
    pub play_mode: PlayMode,
    /// How many shuffle moves Previous can undo.
    pub shuffle_back_stack: usize,
    /// Interval between position updates, in milliseconds.
    pub position_tick_interval_ms: u64,
    /// Playlist database location. `None` uses the XDG data directory.
    pub database_path: Option<String>,
    /// Name under which the current playlist is saved between runs.
    pub session_playlist: String,
    /// Whether to reload the saved session playlist at startup.
    pub restore_session: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            volume: 50,
            play_mode: PlayMode::Sequential,
            shuffle_back_stack: DEFAULT_BACK_STACK_DEPTH,
            position_tick_interval_ms: 1000,
            database_path: None,
            session_playlist: "session".to_string(),
            restore_session: true,
        }
    }
}

impl UserSettings {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.volume > 100 {
            return Err(SettingsError::InvalidValue {
                reason: format!("volume {} exceeds 100", self.volume),
            });
        }
        if self.position_tick_interval_ms == 0 {
            return Err(SettingsError::InvalidValue {
                reason: "position_tick_interval_ms must be positive".to_string(),
            });
        }
        if self.shuffle_back_stack == 0 {
            return Err(SettingsError::InvalidValue {
                reason: "shuffle_back_stack must be positive".to_string(),
            });
        }
        if self.session_playlist.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                reason: "session_playlist must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Resolved playlist database path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .as_ref()
            .map_or_else(get_database_path, PathBuf::from)
    }
}

/// Handles loading, saving, and validation of user preferences.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe user settings storage.
    settings: RwLock<UserSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Custom path for the settings file
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the file exists but cannot be read, parsed
    /// or validated.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings: UserSettings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            from_str(&contents)?
        } else {
            debug!("Using default settings, no file at {:?}", config_path);
            UserSettings::default()
        };
        settings.validate()?;

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Replaces the settings and saves them to disk.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the new settings are invalid or cannot be
    /// saved.
    pub fn update_settings(&self, new_settings: UserSettings) -> Result<(), SettingsError> {
        new_settings.validate()?;
        *self.settings.write() = new_settings;
        self.save_settings()
    }

    /// Applies `change` to a copy of the settings and saves the result if it
    /// differs.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the changed settings are invalid or cannot
    /// be saved.
    pub fn modify<F>(&self, change: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut UserSettings),
    {
        let mut updated = self.settings.read().clone();
        change(&mut updated);
        if updated == *self.settings.read() {
            return Ok(());
        }
        self.update_settings(updated)
    }

    /// Saves the current settings to disk.
    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Subscribes an observer that writes volume and play mode changes back to
/// the settings file.
pub fn persist_preferences(hub: &ObserverHub, manager: Arc<SettingsManager>) -> Subscription {
    hub.subscribe(move |event| {
        let result = match event {
            PlaybackEvent::VolumeChanged(volume) => manager.modify(|settings| settings.volume = *volume),
            PlaybackEvent::ModeChanged(mode) => manager.modify(|settings| settings.play_mode = *mode),
            _ => return,
        };
        if let Err(e) = result {
            warn!("Failed to save preferences: {e}");
        }
    })
}

/// Path of the settings file.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_home("XDG_CONFIG_HOME", ".config");
    config_dir.push(APP_DIR);
    config_dir.push("settings.json");
    config_dir
}

/// Default path of the playlist database.
#[must_use]
pub fn get_database_path() -> PathBuf {
    let mut data_dir = get_xdg_home("XDG_DATA_HOME", ".local/share");
    data_dir.push(APP_DIR);
    data_dir.push("library.db");
    data_dir
}

/// Resolves an XDG base directory.
///
/// Uses the environment variable if set and non-empty, otherwise
/// `$HOME/<fallback>`.
fn get_xdg_home(env_key: &str, fallback: &str) -> PathBuf {
    if let Ok(dir) = var(env_key)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(fallback);
        return path;
    }

    PathBuf::from(".")
}
