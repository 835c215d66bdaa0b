// Actor Repository
// Handles all database operations for actors

use rusqlite::{params, Connection, OptionalExtension};

use crate::models::Actor;
use crate::utils::database::Database;

/// Repository for actor data access
pub struct ActorRepository {
    db: Database,
}

impl ActorRepository {
    /// Create a new ActorRepository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List all actors ordered by name
    pub fn list(&self) -> Result<Vec<Actor>, String> {
        self.db.with_connection(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, created_at FROM actors ORDER BY name")
                .map_err(|e| format!("Failed to prepare statement: {}", e))?;

            let rows = stmt
                .query_map([], map_actor_row)
                .map_err(|e| format!("Failed to query actors: {}", e))?;

            let mut actors = Vec::new();
            for row in rows {
                actors.push(row.map_err(|e| format!("Failed to read row: {}", e))?);
            }
            Ok(actors)
        })
    }

    /// Get an actor by ID
    pub fn get(&self, id: i64) -> Result<Option<Actor>, String> {
        self.db.with_connection(|conn| fetch_actor(conn, id))
    }

    /// Get an actor by its unique name
    pub fn get_by_name(&self, name: &str) -> Result<Option<Actor>, String> {
        self.db.with_connection(|conn| {
            conn.query_row(
                "SELECT id, name, created_at FROM actors WHERE name = ?1",
                params![name],
                map_actor_row,
            )
            .optional()
            .map_err(|e| format!("Failed to get actor: {}", e))
        })
    }

    /// Create a new actor. Names are unique.
    pub fn create(&self, name: &str) -> Result<Actor, String> {
        self.db.with_connection(|conn| {
            conn.execute("INSERT INTO actors (name) VALUES (?1)", params![name])
                .map_err(|e| format!("Failed to create actor: {}", e))?;

            let id = conn.last_insert_rowid();
            fetch_actor(conn, id)?.ok_or_else(|| String::from("Actor vanished after insert"))
        })
    }

    /// Rename an actor
    pub fn rename(&self, id: i64, name: &str) -> Result<(), String> {
        self.db.with_connection(|conn| {
            let rows = conn
                .execute(
                    "UPDATE actors SET name = ?1 WHERE id = ?2",
                    params![name, id],
                )
                .map_err(|e| format!("Failed to rename actor: {}", e))?;
            if rows == 0 {
                return Err(format!("Actor {} does not exist", id));
            }
            Ok(())
        })
    }

    /// Delete an actor. Card links go with it.
    pub fn delete(&self, id: i64) -> Result<bool, String> {
        self.db.with_connection(|conn| {
            let rows_affected = conn
                .execute("DELETE FROM actors WHERE id = ?1", params![id])
                .map_err(|e| format!("Failed to delete actor: {}", e))?;
            Ok(rows_affected > 0)
        })
    }

    /// IDs of cards associated with an actor
    pub fn card_ids_for(&self, actor_id: i64) -> Result<Vec<i64>, String> {
        self.db.with_connection(|conn| {
            let mut stmt = conn
                .prepare("SELECT card_id FROM card_actors WHERE actor_id = ?1 ORDER BY card_id")
                .map_err(|e| format!("Failed to prepare statement: {}", e))?;

            let rows = stmt
                .query_map(params![actor_id], |row| row.get(0))
                .map_err(|e| format!("Failed to query card links: {}", e))?;

            let mut ids = Vec::new();
            for row in rows {
                ids.push(row.map_err(|e| format!("Failed to read row: {}", e))?);
            }
            Ok(ids)
        })
    }
}

fn fetch_actor(conn: &Connection, id: i64) -> Result<Option<Actor>, String> {
    conn.query_row(
        "SELECT id, name, created_at FROM actors WHERE id = ?1",
        params![id],
        map_actor_row,
    )
    .optional()
    .map_err(|e| format!("Failed to get actor: {}", e))
}

fn map_actor_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Actor> {
    Ok(Actor {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use crate::models::{DEFAULT_ALLY_ACTOR, DEFAULT_ENEMY_ACTOR};
    use crate::utils::settings::SettingsStore;
    use tempfile::{tempdir, TempDir};

    fn setup(dir: &TempDir) -> Database {
        let db_path = dir.path().join("cards.db");
        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        migrations::ensure_up_to_date(&db_path, &mut settings).unwrap();
        Database::new(db_path).unwrap()
    }

    #[test]
    fn test_default_actors_are_seeded() {
        let dir = tempdir().unwrap();
        let repo = ActorRepository::new(setup(&dir));

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec![DEFAULT_ENEMY_ACTOR, DEFAULT_ALLY_ACTOR]);
    }

    #[test]
    fn test_create_rename_delete() {
        let dir = tempdir().unwrap();
        let repo = ActorRepository::new(setup(&dir));

        let boss = repo.create("Boss").unwrap();
        assert_eq!(repo.get(boss.id).unwrap().unwrap().name, "Boss");

        repo.rename(boss.id, "Final Boss").unwrap();
        assert_eq!(repo.get_by_name("Final Boss").unwrap().unwrap().id, boss.id);

        assert!(repo.delete(boss.id).unwrap());
        assert!(repo.get(boss.id).unwrap().is_none());
        assert!(!repo.delete(boss.id).unwrap());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let dir = tempdir().unwrap();
        let repo = ActorRepository::new(setup(&dir));
        assert!(repo.create(DEFAULT_ALLY_ACTOR).is_err());
    }
}
