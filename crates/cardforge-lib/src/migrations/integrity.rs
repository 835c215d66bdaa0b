// Database integrity verification
// Non-mutating check that the live schema matches the shape the current
// version expects. Used by the diagnostic tools and available as a
// pre-flight check independent of migration.

use rusqlite::Connection;

use super::inspect;
use crate::models::{TextRegion, LAYOUT_FIELDS};

/// Baseline cards columns (everything except the flattened layout columns)
const CARD_BASE_COLUMNS: [&str; 13] = [
    "id",
    "name",
    "rarity",
    "card_type",
    "side",
    "cost",
    "ally_effect",
    "enemy_effect",
    "action_script",
    "image_path",
    "original_image_path",
    "created_at",
    "updated_at",
];

/// What the verification found
#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub missing_tables: Vec<String>,
    /// Missing columns as `table.column`
    pub missing_columns: Vec<String>,
    /// Non-ok rows from SQLite's own integrity_check
    pub integrity_errors: Vec<String>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.missing_tables.is_empty()
            && self.missing_columns.is_empty()
            && self.integrity_errors.is_empty()
    }
}

/// Tables and columns required at the current schema version
fn required_schema() -> Vec<(&'static str, Vec<String>)> {
    let mut cards: Vec<String> = CARD_BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for region in TextRegion::ALL {
        for field in LAYOUT_FIELDS {
            cards.push(format!("{}_{}", region.column_prefix(), field));
        }
    }

    vec![
        (
            "schema_version",
            vec!["version", "applied_at", "description"]
                .into_iter()
                .map(String::from)
                .collect(),
        ),
        ("cards", cards),
        (
            "actors",
            vec!["id", "name", "created_at"]
                .into_iter()
                .map(String::from)
                .collect(),
        ),
        (
            "card_actors",
            vec!["card_id", "actor_id"].into_iter().map(String::from).collect(),
        ),
    ]
}

/// Compare the live schema against the required shape and run SQLite's
/// integrity_check. Never mutates the database.
pub fn verify_database_integrity(conn: &Connection) -> Result<IntegrityReport, String> {
    let mut report = IntegrityReport::default();

    for (table, columns) in required_schema() {
        if !inspect::table_exists(conn, table)? {
            report.missing_tables.push(table.to_string());
            continue;
        }
        for column in columns {
            if !inspect::has_column(conn, table, &column)? {
                report.missing_columns.push(format!("{}.{}", table, column));
            }
        }
    }

    let mut stmt = conn
        .prepare("PRAGMA integrity_check")
        .map_err(|e| format!("Failed to run integrity check: {}", e))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| format!("Failed to run integrity check: {}", e))?;
    for row in rows {
        let message = row.map_err(|e| format!("Failed to read integrity check result: {}", e))?;
        if message != "ok" {
            report.integrity_errors.push(message);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::{ensure_up_to_date, migrate_to};
    use crate::utils::settings::SettingsStore;
    use tempfile::tempdir;

    #[test]
    fn test_migrated_database_verifies_clean() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cards.db");
        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        ensure_up_to_date(&db_path, &mut settings).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let report = verify_database_integrity(&conn).unwrap();
        assert!(report.is_ok(), "unexpected report: {:?}", report);
    }

    #[test]
    fn test_partial_schema_is_reported() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cards.db");
        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        migrate_to(&db_path, &mut settings, 1).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let report = verify_database_integrity(&conn).unwrap();

        assert!(!report.is_ok());
        assert!(report.missing_tables.contains(&String::from("actors")));
        assert!(report
            .missing_columns
            .contains(&String::from("cards.title_offset_x")));
        assert!(report.integrity_errors.is_empty());
    }
}
