// Migration error taxonomy
// Fatal conditions propagate to the application entry point unmodified;
// the caller decides between aborting and explicit legacy mode.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal migration failures. Soft failures (individual template copies in
/// the dual-target step) never appear here; they are absorbed into the
/// migration report's summary.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The target path is not a valid SQLite database at all
    #[error("{path:?} is not a valid SQLite database")]
    CorruptDatabase { path: PathBuf },

    /// The pre-migration snapshot could not be written. Migration aborts
    /// before any mutation; data safety takes priority over availability.
    #[error("backup failed, refusing to migrate an unprotected database: {message}")]
    Backup { message: String },

    /// The file was written by a newer build than this one supports
    #[error("database schema version {found} is newer than supported version {supported}")]
    NewerSchema { found: i32, supported: i32 },

    /// Opening or inspecting the database failed for an ordinary I/O reason
    #[error("failed to open database: {message}")]
    Open { message: String },

    /// A migration step failed. Steps up to `last_good` remain committed;
    /// the database is left at that version.
    #[error("migration v{version} failed (database left at v{last_good}): {message}")]
    Step {
        version: i32,
        last_good: i32,
        message: String,
    },
}

impl MigrationError {
    /// The version the database was left at, where that is well-defined.
    pub fn last_good_version(&self) -> Option<i32> {
        match self {
            MigrationError::Step { last_good, .. } => Some(*last_good),
            _ => None,
        }
    }
}
