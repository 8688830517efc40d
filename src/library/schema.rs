//! Database schema definition and versioning for saved playlists.
//!
//! This module defines the SQLite schema holding named playlists and
//! favourites, and provides schema versioning for future migrations.

use std::{fs::create_dir_all, path::Path};

use {
    sqlx::{
        Error as SqlxError, SqlitePool, query, query_scalar,
        sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous},
    },
    thiserror::Error,
    tracing::debug,
};

/// Error type for schema operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] SqlxError),
    /// Schema migration error.
    #[error("Schema migration error: {reason}")]
    MigrationError { reason: String },
}

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Database schema definition.
pub struct SchemaManager {
    pool: SqlitePool,
}

impl SchemaManager {
    /// Creates a new schema manager.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initializes the database schema.
    ///
    /// Creates all tables on a fresh database and checks the version of an
    /// existing one.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if schema initialization fails or the database
    /// was written by a different schema version.
    pub async fn initialize_schema(&self) -> Result<(), SchemaError> {
        query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let current_version: Option<i32> = query_scalar("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        match current_version {
            None => {
                debug!("Creating playlist schema v{CURRENT_SCHEMA_VERSION}");
                self.create_tables().await?;
                query("INSERT INTO schema_version (version) VALUES (?)")
                    .bind(CURRENT_SCHEMA_VERSION)
                    .execute(&self.pool)
                    .await?;
            }
            Some(version) if version == CURRENT_SCHEMA_VERSION => {}
            Some(version) => {
                return Err(SchemaError::MigrationError {
                    reason: format!("Schema migration from version {version} not implemented"),
                });
            }
        }

        Ok(())
    }

    /// Creates all database tables.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if table creation fails.
    async fn create_tables(&self) -> Result<(), SchemaError> {
        query(
            r#"
            CREATE TABLE playlists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Position keeps playlist order; the same path may appear twice.
        query(
            r#"
            CREATE TABLE playlist_tracks (
                playlist_id INTEGER NOT NULL,
                position INTEGER NOT NULL,
                path TEXT NOT NULL,
                title TEXT NOT NULL,
                duration_ms INTEGER,
                PRIMARY KEY (playlist_id, position),
                FOREIGN KEY (playlist_id) REFERENCES playlists (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        query(
            r#"
            CREATE TABLE favourites (
                path TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                duration_ms INTEGER,
                added_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        query("CREATE INDEX idx_playlist_tracks_path ON playlist_tracks (path)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets the current schema version, or 0 if not initialized.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the version table cannot be queried.
    pub async fn get_current_version(&self) -> Result<i32, SchemaError> {
        let version: Option<i32> = query_scalar("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(version.unwrap_or(0))
    }
}

/// Opens (creating if needed) the database at `path`.
///
/// # Errors
///
/// Returns `SchemaError` if the parent directory cannot be created or the
/// database cannot be opened.
pub async fn create_connection_pool(path: &Path) -> Result<SqlitePool, SchemaError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).map_err(|e| SchemaError::ConnectionError(SqlxError::Io(e)))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}
