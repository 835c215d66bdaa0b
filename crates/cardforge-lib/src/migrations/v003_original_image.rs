// v3: original image pointer
// Compositing used to overwrite image_path in place, destroying the source
// illustration. Keep a separate pointer to the untouched original; seed it
// from image_path for existing rows.

use rusqlite::Connection;

use super::{inspect, MigrationContext};

pub(crate) const VERSION: i32 = 3;
pub(crate) const DESCRIPTION: &str = "Original illustration pointer";

pub(crate) fn up(conn: &Connection, _ctx: &mut MigrationContext) -> Result<(), String> {
    if !inspect::has_column(conn, "cards", "original_image_path")? {
        conn.execute("ALTER TABLE cards ADD COLUMN original_image_path TEXT", [])
            .map_err(|e| format!("Failed to add column cards.original_image_path: {}", e))?;
    }

    conn.execute(
        "UPDATE cards SET original_image_path = image_path
         WHERE original_image_path IS NULL AND image_path IS NOT NULL",
        [],
    )
    .map_err(|e| format!("Failed to backfill original_image_path: {}", e))?;

    Ok(())
}
