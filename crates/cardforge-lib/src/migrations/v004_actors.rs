// v4: actors
// Replaces the fixed two-valued side classification with a named actor
// entity and a card/actor link table. Existing cards are linked once to a
// default actor derived from their legacy side value.
//
// Table creation and backfill run in the same step and therefore commit in
// one transaction with the version bump; a crash can never leave the tables
// created but unpopulated. The empty-table guard additionally makes the
// backfill safe to re-run if the version marker was removed by hand.

use rusqlite::{params, Connection};

use super::MigrationContext;
use crate::models::{DEFAULT_ALLY_ACTOR, DEFAULT_ENEMY_ACTOR};

pub(crate) const VERSION: i32 = 4;
pub(crate) const DESCRIPTION: &str = "Actors and card/actor associations";

pub(crate) fn up(conn: &Connection, _ctx: &mut MigrationContext) -> Result<(), String> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS actors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS card_actors (
            card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            actor_id INTEGER NOT NULL REFERENCES actors(id) ON DELETE CASCADE,
            PRIMARY KEY (card_id, actor_id)
        );
        CREATE INDEX IF NOT EXISTS idx_card_actors_actor ON card_actors(actor_id);
        "#,
    )
    .map_err(|e| format!("Failed to create actor tables: {}", e))?;

    let actor_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM actors", [], |row| row.get(0))
        .map_err(|e| format!("Failed to count actors: {}", e))?;
    if actor_count > 0 {
        // Already seeded by a previous run
        return Ok(());
    }

    for name in [DEFAULT_ALLY_ACTOR, DEFAULT_ENEMY_ACTOR] {
        conn.execute("INSERT INTO actors (name) VALUES (?1)", params![name])
            .map_err(|e| format!("Failed to seed actor '{}': {}", name, e))?;
    }

    // One link per existing card, derived from its legacy side value
    conn.execute(
        r#"
        INSERT INTO card_actors (card_id, actor_id)
        SELECT c.id, a.id
        FROM cards c
        JOIN actors a ON a.name = CASE c.side WHEN 'enemy' THEN ?1 ELSE ?2 END
        "#,
        params![DEFAULT_ENEMY_ACTOR, DEFAULT_ALLY_ACTOR],
    )
    .map_err(|e| format!("Failed to derive card/actor links: {}", e))?;

    Ok(())
}
