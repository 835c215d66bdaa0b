// SQLite database connection management
// Thread-safe wrapper shared by the repositories and the diagnostic tools

use rusqlite::{Connection, OpenFlags, Result as SqliteResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::settings;
use crate::migrations::{self, MigrationError, MigrationReport};
use crate::utils::settings::{AppSettings, SettingsStore};

/// Database file name
#[cfg(debug_assertions)]
pub const DATABASE_FILE: &str = "cardforge-dev.db";

#[cfg(not(debug_assertions))]
pub const DATABASE_FILE: &str = "cardforge.db";

/// Thread-safe database wrapper
/// Uses Arc<Mutex<Connection>> for concurrent access from multiple threads
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Open the database at `path` and configure the connection. Does not
    /// run migrations; callers that want the startup contract use
    /// [`Database::open_migrated`].
    pub fn new(path: PathBuf) -> Result<Self, String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create database directory: {}", e))?;
        }

        let conn =
            Connection::open(&path).map_err(|e| format!("Failed to open database: {}", e))?;

        // Configure SQLite for optimal concurrent access
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=5000;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            "#,
        )
        .map_err(|e| format!("Failed to configure database: {}", e))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Application-startup entry point: bring the file up to the current
    /// schema version, then open it. The report says what (if anything)
    /// was migrated and where the pre-run backup landed.
    pub fn open_migrated(
        path: PathBuf,
        settings: &mut SettingsStore,
    ) -> Result<(Self, MigrationReport), MigrationError> {
        let report = migrations::ensure_up_to_date(&path, settings)?;
        let db = Self::new(path).map_err(|message| MigrationError::Open { message })?;
        Ok((db, report))
    }

    /// Degraded legacy mode: open the file read-only without touching the
    /// schema. Used when the caller explicitly chooses to continue after a
    /// failed migration.
    pub fn open_legacy(path: PathBuf) -> Result<Self, String> {
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| format!("Failed to open database read-only: {}", e))?;

        conn.execute_batch("PRAGMA busy_timeout=5000; PRAGMA foreign_keys=ON;")
            .map_err(|e| format!("Failed to configure database: {}", e))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Get database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Get a lock on the connection for executing queries
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|e| format!("Failed to acquire database lock: {}", e))
    }

    /// Execute a function with the database connection
    /// The closure should return Result<T, String> with errors already converted
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> Result<T, String>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Execute a function with the database connection (raw SQLite result)
    /// For operations that want to use rusqlite's error type directly
    pub fn with_connection_raw<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.lock()?;
        f(&conn).map_err(|e| format!("Database error: {}", e))
    }

    /// Execute a function with a transaction
    /// Automatically commits on success, rolls back on error
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> Result<T, String>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| format!("Failed to start transaction: {}", e))?;

        match f(&tx) {
            Ok(result) => {
                tx.commit()
                    .map_err(|e| format!("Failed to commit transaction: {}", e))?;
                Ok(result)
            }
            Err(e) => {
                // Transaction rolls back when dropped
                Err(e)
            }
        }
    }

    /// Check if the database file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Get the current schema version
    pub fn schema_version(&self) -> Result<i32, String> {
        self.with_connection_raw(|conn| {
            conn.query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
        })
        .or_else(|_| Ok(0))
    }
}

/// Resolve the database path: an explicit settings override wins, otherwise
/// the default file inside the app data directory.
pub fn get_database_path(settings: &AppSettings) -> Result<PathBuf, String> {
    if let Some(path) = &settings.database_path {
        return Ok(path.clone());
    }
    settings::get_app_data_dir().map(|p| p.join(DATABASE_FILE))
}

/// Convenience for binaries: resolve the path from a loaded settings store
pub fn resolve_database_path(store: &SettingsStore, override_path: Option<&Path>) -> Result<PathBuf, String> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => get_database_path(store.settings()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_creation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path.clone()).unwrap();

        assert!(path.exists());
        // No migrations were run, so there is no schema_version table yet
        assert_eq!(db.schema_version().unwrap(), 0);
    }

    #[test]
    fn test_wal_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path).unwrap();

        let mode: String = db
            .with_connection_raw(|conn| conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)))
            .unwrap();

        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_transaction() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path).unwrap();

        let result = db.with_transaction(|conn| {
            conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", [])
                .map_err(|e| e.to_string())?;
            Ok(42)
        });
        assert_eq!(result.unwrap(), 42);

        let exists: i32 = db
            .with_connection_raw(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='test'",
                    [],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_eq!(exists, 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(path).unwrap();

        let result: Result<(), String> = db.with_transaction(|conn| {
            conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", [])
                .map_err(|e| e.to_string())?;
            Err(String::from("boom"))
        });
        assert!(result.is_err());

        let exists: i32 = db
            .with_connection_raw(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='test'",
                    [],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_eq!(exists, 0);
    }

    #[test]
    fn test_open_legacy_is_read_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        // Create a database file first
        drop(Database::new(path.clone()).unwrap());

        let db = Database::open_legacy(path).unwrap();
        let result = db.with_connection_raw(|conn| {
            conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", [])
        });
        assert!(result.is_err());
    }
}
