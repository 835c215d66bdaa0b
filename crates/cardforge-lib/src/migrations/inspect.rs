// Schema inspector
// Read-only helpers for determining a database file's structural version
// and column inventory. Nothing in here mutates the database.

use rusqlite::{params, Connection, ErrorCode};
use std::fmt;

/// Structural version of a database file.
///
/// A file written before the version marker existed has no
/// `schema_version` table at all; that is a valid, expected state and is
/// kept distinct from `Known(0)` rather than conflated with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Pre-versioning legacy file (or a brand new, empty file)
    Unversioned,
    /// Version recorded in the schema_version table
    Known(i32),
}

impl SchemaVersion {
    /// Numeric version used for step sequencing; legacy files migrate from 0.
    pub fn effective(&self) -> i32 {
        match self {
            SchemaVersion::Unversioned => 0,
            SchemaVersion::Known(v) => *v,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::Unversioned => write!(f, "unversioned"),
            SchemaVersion::Known(v) => write!(f, "{}", v),
        }
    }
}

/// Probe whether the file behind this connection is a SQLite database at
/// all. Returns Ok(false) for files SQLite refuses to read.
pub fn is_valid_database(conn: &Connection) -> Result<bool, String> {
    match conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    }) {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::NotADatabase => Ok(false),
        Err(e) => Err(format!("Failed to probe database file: {}", e)),
    }
}

/// Current structural version. Absence of the schema_version table is not
/// an error; it means the file predates versioning.
pub fn current_version(conn: &Connection) -> Result<SchemaVersion, String> {
    if !table_exists(conn, "schema_version")? {
        return Ok(SchemaVersion::Unversioned);
    }

    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| format!("Failed to get schema version: {}", e))?;
    Ok(SchemaVersion::Known(version))
}

/// Check if a table exists
pub fn table_exists(conn: &Connection, table_name: &str) -> Result<bool, String> {
    let count: i32 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            params![table_name],
            |row| row.get(0),
        )
        .map_err(|e| format!("Failed to check table existence: {}", e))?;
    Ok(count > 0)
}

/// Check if a column exists on a table. Used by migration steps to make
/// themselves re-runnable against a database a previous partial run may
/// have already touched.
pub fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool, String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| format!("Failed to inspect table {}: {}", table, e))?;
    let mut rows = stmt
        .query([])
        .map_err(|e| format!("Failed to inspect table {}: {}", table, e))?;

    while let Some(row) = rows
        .next()
        .map_err(|e| format!("Failed to read table info: {}", e))?
    {
        let name: String = row
            .get(1)
            .map_err(|e| format!("Failed to read column name: {}", e))?;
        if name.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_database_is_unversioned() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_version(&conn).unwrap(), SchemaVersion::Unversioned);
    }

    #[test]
    fn test_known_version_is_max_row() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TEXT, description TEXT);
            INSERT INTO schema_version (version) VALUES (1), (2), (3);
            "#,
        )
        .unwrap();
        assert_eq!(current_version(&conn).unwrap(), SchemaVersion::Known(3));
    }

    #[test]
    fn test_empty_version_table_reads_as_zero() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TEXT, description TEXT);",
        )
        .unwrap();
        assert_eq!(current_version(&conn).unwrap(), SchemaVersion::Known(0));
    }

    #[test]
    fn test_has_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE cards (id INTEGER PRIMARY KEY, name TEXT);")
            .unwrap();

        assert!(has_column(&conn, "cards", "name").unwrap());
        assert!(!has_column(&conn, "cards", "rarity").unwrap());
        assert!(!has_column(&conn, "missing_table", "name").unwrap_or(false));
    }

    #[test]
    fn test_effective_version() {
        assert_eq!(SchemaVersion::Unversioned.effective(), 0);
        assert_eq!(SchemaVersion::Known(4).effective(), 4);
    }
}
