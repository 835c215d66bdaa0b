// v1: baseline schema
// Creates the version marker and the cards table. Everything is
// IF NOT EXISTS so a legacy pre-versioning file that already carries a
// cards table is adopted as-is instead of being clobbered.

use rusqlite::Connection;

use super::MigrationContext;

pub(crate) const VERSION: i32 = 1;
pub(crate) const DESCRIPTION: &str = "Baseline schema (cards table and version marker)";

pub(crate) fn up(conn: &Connection, _ctx: &mut MigrationContext) -> Result<(), String> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now')),
            description TEXT
        );

        -- Cards table
        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            rarity TEXT NOT NULL DEFAULT 'common',
            card_type TEXT,
            side TEXT NOT NULL DEFAULT 'ally' CHECK(side IN ('ally', 'enemy')),
            cost INTEGER NOT NULL DEFAULT 0,
            ally_effect TEXT NOT NULL DEFAULT '{}',
            enemy_effect TEXT NOT NULL DEFAULT '{}',
            action_script TEXT,
            image_path TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_cards_name ON cards(name);
        CREATE INDEX IF NOT EXISTS idx_cards_rarity ON cards(rarity);
        "#,
    )
    .map_err(|e| format!("Failed to create baseline schema: {}", e))
}
