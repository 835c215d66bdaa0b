// v2: per-region text layout columns
// Adds flattened layout metadata (position, font, size, color, alignment,
// wrap width) for the three text regions on the card face. Column defaults
// reproduce the renderer's previous hard-coded behavior, so existing rows
// stay semantically valid without a backfill pass.

use rusqlite::Connection;

use super::{inspect, MigrationContext};
use crate::models::{TextLayout, TextRegion};

pub(crate) const VERSION: i32 = 2;
pub(crate) const DESCRIPTION: &str = "Per-region text layout columns";

pub(crate) fn up(conn: &Connection, _ctx: &mut MigrationContext) -> Result<(), String> {
    for region in TextRegion::ALL {
        for (column, decl) in column_specs(region) {
            // Tolerate a previous partial run that already added some of
            // these columns
            if inspect::has_column(conn, "cards", &column)? {
                continue;
            }
            conn.execute(&format!("ALTER TABLE cards ADD COLUMN {} {}", column, decl), [])
                .map_err(|e| format!("Failed to add column cards.{}: {}", column, e))?;
        }
    }
    Ok(())
}

/// Column name and SQL declaration for each layout field of a region
pub(crate) fn column_specs(region: TextRegion) -> Vec<(String, String)> {
    let prefix = region.column_prefix();
    let defaults: TextLayout = region.default_layout();
    vec![
        (
            format!("{}_offset_x", prefix),
            format!("INTEGER NOT NULL DEFAULT {}", defaults.offset_x),
        ),
        (
            format!("{}_offset_y", prefix),
            format!("INTEGER NOT NULL DEFAULT {}", defaults.offset_y),
        ),
        (
            format!("{}_font", prefix),
            format!("TEXT NOT NULL DEFAULT '{}'", defaults.font),
        ),
        (
            format!("{}_font_size", prefix),
            format!("INTEGER NOT NULL DEFAULT {}", defaults.font_size),
        ),
        (
            format!("{}_color", prefix),
            format!("TEXT NOT NULL DEFAULT '{}'", defaults.color),
        ),
        (
            format!("{}_align", prefix),
            format!("TEXT NOT NULL DEFAULT '{}'", defaults.align.as_str()),
        ),
        (
            format!("{}_wrap_width", prefix),
            format!("INTEGER NOT NULL DEFAULT {}", defaults.wrap_width),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::MigrationContext;
    use crate::utils::settings::SettingsStore;
    use tempfile::tempdir;

    #[test]
    fn test_rerun_after_partial_add_is_safe() {
        let dir = tempdir().unwrap();
        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE cards (id INTEGER PRIMARY KEY, name TEXT NOT NULL, image_path TEXT);",
        )
        .unwrap();

        // Simulate an interrupted earlier attempt that got one column in
        conn.execute(
            "ALTER TABLE cards ADD COLUMN title_offset_x INTEGER NOT NULL DEFAULT 16",
            [],
        )
        .unwrap();

        let mut ctx = MigrationContext::new(&mut settings);
        up(&conn, &mut ctx).unwrap();
        up(&conn, &mut ctx).unwrap();

        assert!(inspect::has_column(&conn, "cards", "title_offset_x").unwrap());
        assert!(inspect::has_column(&conn, "cards", "cost_wrap_width").unwrap());
    }
}
