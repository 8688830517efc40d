//! Playlist persistence using sqlx with SQLite.
//!
//! `PlaylistStore` keeps named playlists (ordered, duplicates allowed) and a
//! favourites list (one entry per path).

use std::{fmt::Display, path::Path, sync::LazyLock};

use {
    regex::Regex,
    sqlx::{
        Error as SqlxError, Row, SqliteConnection, SqlitePool, query, query_scalar,
        sqlite::SqliteRow,
    },
    thiserror::Error,
    tracing::{debug, info},
};

use crate::library::{
    models::{Playlist, Track},
    schema::{SchemaError, SchemaManager, create_connection_pool},
};

/// Letters in any script, digits, whitespace, `!`, `_` and `-`.
static PLAYLIST_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s!-]+$").expect("playlist name pattern is valid"));

/// Error type for playlist store operations.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),
    /// Schema initialization error.
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),
    /// A playlist name with characters outside the allowed set.
    #[error("Invalid playlist name: '{name}'")]
    InvalidName { name: String },
    /// Record not found.
    #[error("Record not found: {entity} '{key}'")]
    NotFound { entity: String, key: String },
    /// Record already present.
    #[error("Already exists: {entity} '{key}'")]
    AlreadyExists { entity: String, key: String },
    /// A value too large for an SQLite integer column.
    #[error("Value {value} does not fit column '{column}'")]
    ValueOutOfRange { column: &'static str, value: String },
}

/// Checks a playlist name against the allowed character set.
#[must_use]
pub fn is_valid_playlist_name(name: &str) -> bool {
    !name.trim().is_empty() && PLAYLIST_NAME.is_match(name)
}

/// Named playlists and favourites.
///
/// Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PlaylistStore {
    pool: SqlitePool,
}

impl PlaylistStore {
    /// Opens the store at `path`, creating the database and schema if needed.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the database cannot be opened or its schema
    /// cannot be initialized.
    pub async fn open(path: &Path) -> Result<Self, LibraryError> {
        let pool = create_connection_pool(path).await?;
        SchemaManager::new(pool.clone()).initialize_schema().await?;
        debug!("Playlist store opened at {}", path.display());

        Ok(Self { pool })
    }

    /// Names of all saved playlists, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` if the query fails.
    pub async fn list_playlists(&self) -> Result<Vec<String>, LibraryError> {
        let names = query_scalar("SELECT name FROM playlists ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Creates an empty playlist.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for a disallowed name, `AlreadyExists` if the
    /// name is taken, or `DatabaseError` if the insert fails.
    pub async fn create_playlist(&self, name: &str) -> Result<(), LibraryError> {
        validate_name(name)?;
        if self.playlist_id(name).await?.is_some() {
            return Err(already_exists("playlist", name));
        }

        query("INSERT INTO playlists (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        info!("Created playlist '{name}'");
        Ok(())
    }

    /// Deletes a playlist and its entries.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such playlist exists.
    pub async fn delete_playlist(&self, name: &str) -> Result<(), LibraryError> {
        let id = self.require_playlist(name).await?;

        let mut tx = self.pool.begin().await?;
        query("DELETE FROM playlist_tracks WHERE playlist_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Deleted playlist '{name}'");
        Ok(())
    }

    /// Deletes every playlist. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete_all_playlists(&self) -> Result<u64, LibraryError> {
        let mut tx = self.pool.begin().await?;
        query("DELETE FROM playlist_tracks").execute(&mut *tx).await?;
        let removed = query("DELETE FROM playlists").execute(&mut *tx).await?;
        tx.commit().await?;

        info!("Deleted {} playlists", removed.rows_affected());
        Ok(removed.rows_affected())
    }

    /// Loads a playlist in saved order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such playlist exists.
    pub async fn load_playlist(&self, name: &str) -> Result<Playlist, LibraryError> {
        let id = self.require_playlist(name).await?;

        let rows = query(
            r#"
            SELECT path, title, duration_ms
            FROM playlist_tracks
            WHERE playlist_id = ?
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(track_from_row).collect()
    }

    /// Replaces the contents of a playlist, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for a disallowed name or `DatabaseError` if the
    /// write fails. On failure the previous contents are kept.
    pub async fn save_playlist(&self, name: &str, playlist: &Playlist) -> Result<(), LibraryError> {
        validate_name(name)?;

        let mut tx = self.pool.begin().await?;
        query("INSERT OR IGNORE INTO playlists (name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        let id: i64 = query_scalar("SELECT id FROM playlists WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        replace_entries(&mut tx, id, playlist).await?;
        query("UPDATE playlists SET updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Saved {} tracks to playlist '{name}'", playlist.len());
        Ok(())
    }

    /// Appends a track to a playlist unless its path is already there.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such playlist exists or `AlreadyExists` if the
    /// playlist already holds this path.
    pub async fn add_to_playlist(&self, name: &str, track: &Track) -> Result<(), LibraryError> {
        let id = self.require_playlist(name).await?;

        let present: i64 = query_scalar(
            "SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ? AND path = ?",
        )
        .bind(id)
        .bind(&track.path)
        .fetch_one(&self.pool)
        .await?;
        if present > 0 {
            return Err(already_exists("track", &track.path));
        }

        query(
            r#"
            INSERT INTO playlist_tracks (playlist_id, position, path, title, duration_ms)
            VALUES (?, (SELECT COALESCE(MAX(position) + 1, 0) FROM playlist_tracks WHERE playlist_id = ?), ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(id)
        .bind(&track.path)
        .bind(&track.title)
        .bind(duration_column(track)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Removes every entry for `path` from a playlist.
    ///
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such playlist exists.
    pub async fn remove_from_playlist(&self, name: &str, path: &str) -> Result<bool, LibraryError> {
        let id = self.require_playlist(name).await?;
        let playlist = self.load_playlist(name).await?;
        if !playlist.iter().any(|track| track.path == path) {
            return Ok(false);
        }

        let remaining: Playlist = playlist
            .into_tracks()
            .into_iter()
            .filter(|track| track.path != path)
            .collect();
        let mut tx = self.pool.begin().await?;
        replace_entries(&mut tx, id, &remaining).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Adds a track to favourites.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the path is already a favourite.
    pub async fn add_favourite(&self, track: &Track) -> Result<(), LibraryError> {
        if self.is_favourite(&track.path).await? {
            return Err(already_exists("favourite", &track.path));
        }

        query("INSERT INTO favourites (path, title, duration_ms) VALUES (?, ?, ?)")
            .bind(&track.path)
            .bind(&track.title)
            .bind(duration_column(track)?)
            .execute(&self.pool)
            .await?;
        debug!("Added favourite {}", track.path);
        Ok(())
    }

    /// Removes a favourite. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn remove_favourite(&self, path: &str) -> Result<bool, LibraryError> {
        let result = query("DELETE FROM favourites WHERE path = ?")
            .bind(path)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes all favourites.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn clear_favourites(&self) -> Result<(), LibraryError> {
        query("DELETE FROM favourites").execute(&self.pool).await?;
        Ok(())
    }

    /// Whether `path` is a favourite.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn is_favourite(&self, path: &str) -> Result<bool, LibraryError> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM favourites WHERE path = ?")
            .bind(path)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Favourites in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn favourites(&self) -> Result<Playlist, LibraryError> {
        let rows = query("SELECT path, title, duration_ms FROM favourites ORDER BY added_at, rowid")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(track_from_row).collect()
    }

    async fn playlist_id(&self, name: &str) -> Result<Option<i64>, LibraryError> {
        let id = query_scalar("SELECT id FROM playlists WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn require_playlist(&self, name: &str) -> Result<i64, LibraryError> {
        self.playlist_id(name).await?.ok_or_else(|| LibraryError::NotFound {
            entity: "playlist".to_string(),
            key: name.to_string(),
        })
    }
}

/// Rewrites the entries of playlist `id` with positions `0..len`.
async fn replace_entries(
    conn: &mut SqliteConnection,
    id: i64,
    playlist: &Playlist,
) -> Result<(), LibraryError> {
    query("DELETE FROM playlist_tracks WHERE playlist_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    for (position, track) in playlist.iter().enumerate() {
        query(
            r#"
            INSERT INTO playlist_tracks (playlist_id, position, path, title, duration_ms)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(sql_integer("position", position)?)
        .bind(&track.path)
        .bind(&track.title)
        .bind(duration_column(track)?)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Converts an unsigned value for an INTEGER column.
fn sql_integer<T>(column: &'static str, value: T) -> Result<i64, LibraryError>
where
    T: TryInto<i64> + Display + Copy,
{
    value
        .try_into()
        .map_err(|_| LibraryError::ValueOutOfRange {
            column,
            value: value.to_string(),
        })
}

fn duration_column(track: &Track) -> Result<Option<i64>, LibraryError> {
    track
        .duration_ms
        .map(|ms| sql_integer("duration_ms", ms))
        .transpose()
}

fn validate_name(name: &str) -> Result<(), LibraryError> {
    if is_valid_playlist_name(name) {
        Ok(())
    } else {
        Err(LibraryError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn already_exists(entity: &str, key: &str) -> LibraryError {
    LibraryError::AlreadyExists {
        entity: entity.to_string(),
        key: key.to_string(),
    }
}

fn track_from_row(row: &SqliteRow) -> Result<Track, LibraryError> {
    let duration: Option<i64> = row.try_get("duration_ms")?;
    Ok(Track::new(
        row.try_get::<String, _>("path")?,
        row.try_get::<String, _>("title")?,
        duration.and_then(|ms| u64::try_from(ms).ok()),
    ))
}
