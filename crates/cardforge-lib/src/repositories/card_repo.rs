// Card Repository
// Handles all database operations for cards and their actor associations

use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Actor, Card, EffectProfile, NewCard, Rarity, Side, TextAlign, TextLayout};
use crate::utils::database::Database;

/// Select list matching the order `map_card_row` reads columns in
const CARD_COLUMNS: &str = "id, name, rarity, card_type, side, cost, ally_effect, enemy_effect, \
     action_script, image_path, original_image_path, created_at, updated_at, \
     title_offset_x, title_offset_y, title_font, title_font_size, title_color, title_align, title_wrap_width, \
     body_offset_x, body_offset_y, body_font, body_font_size, body_color, body_align, body_wrap_width, \
     cost_offset_x, cost_offset_y, cost_font, cost_font_size, cost_color, cost_align, cost_wrap_width";

/// Repository for card data access
pub struct CardRepository {
    db: Database,
}

impl CardRepository {
    /// Create a new CardRepository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List all cards ordered by name
    pub fn list(&self) -> Result<Vec<Card>, String> {
        self.db.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!("SELECT {} FROM cards ORDER BY name", CARD_COLUMNS))
                .map_err(|e| format!("Failed to prepare statement: {}", e))?;

            let rows = stmt
                .query_map([], map_card_row)
                .map_err(|e| format!("Failed to query cards: {}", e))?;

            let mut cards = Vec::new();
            for row in rows {
                cards.push(row.map_err(|e| format!("Failed to read row: {}", e))?);
            }
            Ok(cards)
        })
    }

    /// List cards of one rarity, ordered by name
    pub fn list_by_rarity(&self, rarity: Rarity) -> Result<Vec<Card>, String> {
        self.db.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM cards WHERE rarity = ?1 ORDER BY name",
                    CARD_COLUMNS
                ))
                .map_err(|e| format!("Failed to prepare statement: {}", e))?;

            let rows = stmt
                .query_map(params![rarity.as_str()], map_card_row)
                .map_err(|e| format!("Failed to query cards: {}", e))?;

            let mut cards = Vec::new();
            for row in rows {
                cards.push(row.map_err(|e| format!("Failed to read row: {}", e))?);
            }
            Ok(cards)
        })
    }

    /// Get a card by ID
    pub fn get(&self, id: i64) -> Result<Option<Card>, String> {
        self.db.with_connection(|conn| fetch_card(conn, id))
    }

    /// Insert a new card and return the stored row. Layout columns take
    /// their defaults; the original image pointer starts at the
    /// illustration the card was created with.
    pub fn create(&self, card: &NewCard) -> Result<Card, String> {
        let ally_effect = serde_json::to_string(&card.ally_effect)
            .map_err(|e| format!("Failed to serialize ally effect: {}", e))?;
        let enemy_effect = serde_json::to_string(&card.enemy_effect)
            .map_err(|e| format!("Failed to serialize enemy effect: {}", e))?;

        self.db.with_connection(|conn| {
            conn.execute(
                r#"
                INSERT INTO cards
                (name, rarity, card_type, side, cost, ally_effect, enemy_effect,
                 action_script, image_path, original_image_path)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    card.name,
                    card.rarity.as_str(),
                    card.card_type,
                    card.side.as_str(),
                    card.cost,
                    ally_effect,
                    enemy_effect,
                    card.action_script,
                    card.image_path,
                    card.image_path,
                ],
            )
            .map_err(|e| format!("Failed to create card: {}", e))?;

            let id = conn.last_insert_rowid();
            fetch_card(conn, id)?.ok_or_else(|| String::from("Card vanished after insert"))
        })
    }

    /// Update an existing card, including its layout metadata
    pub fn update(&self, card: &Card) -> Result<(), String> {
        let ally_effect = serde_json::to_string(&card.ally_effect)
            .map_err(|e| format!("Failed to serialize ally effect: {}", e))?;
        let enemy_effect = serde_json::to_string(&card.enemy_effect)
            .map_err(|e| format!("Failed to serialize enemy effect: {}", e))?;

        self.db.with_connection(|conn| {
            let rows = conn
                .execute(
                    r#"
                    UPDATE cards SET
                        name = ?1, rarity = ?2, card_type = ?3, side = ?4, cost = ?5,
                        ally_effect = ?6, enemy_effect = ?7, action_script = ?8,
                        image_path = ?9, original_image_path = ?10,
                        title_offset_x = ?11, title_offset_y = ?12, title_font = ?13,
                        title_font_size = ?14, title_color = ?15, title_align = ?16,
                        title_wrap_width = ?17,
                        body_offset_x = ?18, body_offset_y = ?19, body_font = ?20,
                        body_font_size = ?21, body_color = ?22, body_align = ?23,
                        body_wrap_width = ?24,
                        cost_offset_x = ?25, cost_offset_y = ?26, cost_font = ?27,
                        cost_font_size = ?28, cost_color = ?29, cost_align = ?30,
                        cost_wrap_width = ?31,
                        updated_at = datetime('now')
                    WHERE id = ?32
                    "#,
                    params![
                        card.name,
                        card.rarity.as_str(),
                        card.card_type,
                        card.side.as_str(),
                        card.cost,
                        ally_effect,
                        enemy_effect,
                        card.action_script,
                        card.image_path,
                        card.original_image_path,
                        card.title_layout.offset_x,
                        card.title_layout.offset_y,
                        card.title_layout.font,
                        card.title_layout.font_size,
                        card.title_layout.color,
                        card.title_layout.align.as_str(),
                        card.title_layout.wrap_width,
                        card.body_layout.offset_x,
                        card.body_layout.offset_y,
                        card.body_layout.font,
                        card.body_layout.font_size,
                        card.body_layout.color,
                        card.body_layout.align.as_str(),
                        card.body_layout.wrap_width,
                        card.cost_layout.offset_x,
                        card.cost_layout.offset_y,
                        card.cost_layout.font,
                        card.cost_layout.font_size,
                        card.cost_layout.color,
                        card.cost_layout.align.as_str(),
                        card.cost_layout.wrap_width,
                        card.id,
                    ],
                )
                .map_err(|e| format!("Failed to update card: {}", e))?;

            if rows == 0 {
                return Err(format!("Card {} does not exist", card.id));
            }
            Ok(())
        })
    }

    /// Delete a card by ID. Actor links go with it.
    pub fn delete(&self, id: i64) -> Result<bool, String> {
        self.db.with_connection(|conn| {
            let rows_affected = conn
                .execute("DELETE FROM cards WHERE id = ?1", params![id])
                .map_err(|e| format!("Failed to delete card: {}", e))?;
            Ok(rows_affected > 0)
        })
    }

    /// Replace a card's actor associations
    pub fn set_actors(&self, card_id: i64, actor_ids: &[i64]) -> Result<(), String> {
        self.db.with_transaction(|conn| {
            conn.execute(
                "DELETE FROM card_actors WHERE card_id = ?1",
                params![card_id],
            )
            .map_err(|e| format!("Failed to clear card actors: {}", e))?;

            for actor_id in actor_ids {
                conn.execute(
                    "INSERT INTO card_actors (card_id, actor_id) VALUES (?1, ?2)",
                    params![card_id, actor_id],
                )
                .map_err(|e| format!("Failed to link actor {}: {}", actor_id, e))?;
            }
            Ok(())
        })
    }

    /// Actors associated with a card, ordered by name
    pub fn actors_for(&self, card_id: i64) -> Result<Vec<Actor>, String> {
        self.db.with_connection(|conn| {
            let mut stmt = conn
                .prepare(
                    r#"
                    SELECT a.id, a.name, a.created_at
                    FROM actors a
                    JOIN card_actors ca ON ca.actor_id = a.id
                    WHERE ca.card_id = ?1
                    ORDER BY a.name
                    "#,
                )
                .map_err(|e| format!("Failed to prepare statement: {}", e))?;

            let rows = stmt
                .query_map(params![card_id], |row| {
                    Ok(Actor {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })
                .map_err(|e| format!("Failed to query actors: {}", e))?;

            let mut actors = Vec::new();
            for row in rows {
                actors.push(row.map_err(|e| format!("Failed to read row: {}", e))?);
            }
            Ok(actors)
        })
    }
}

/// Fetch one card on an already-held connection
fn fetch_card(conn: &Connection, id: i64) -> Result<Option<Card>, String> {
    conn.query_row(
        &format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS),
        params![id],
        map_card_row,
    )
    .optional()
    .map_err(|e| format!("Failed to get card: {}", e))
}

fn map_card_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        name: row.get(1)?,
        rarity: Rarity::parse(&row.get::<_, String>(2)?),
        card_type: row.get(3)?,
        side: Side::parse(&row.get::<_, String>(4)?),
        cost: row.get(5)?,
        ally_effect: EffectProfile::from_json(&row.get::<_, String>(6)?),
        enemy_effect: EffectProfile::from_json(&row.get::<_, String>(7)?),
        action_script: row.get(8)?,
        image_path: row.get(9)?,
        original_image_path: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
        title_layout: layout_at(row, 13)?,
        body_layout: layout_at(row, 20)?,
        cost_layout: layout_at(row, 27)?,
    })
}

/// Read the seven layout columns of one region starting at `base`
fn layout_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<TextLayout> {
    Ok(TextLayout {
        offset_x: row.get(base)?,
        offset_y: row.get(base + 1)?,
        font: row.get(base + 2)?,
        font_size: row.get(base + 3)?,
        color: row.get(base + 4)?,
        align: TextAlign::parse(&row.get::<_, String>(base + 5)?),
        wrap_width: row.get(base + 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use crate::models::TextRegion;
    use crate::utils::settings::SettingsStore;
    use tempfile::{tempdir, TempDir};

    fn setup(dir: &TempDir) -> Database {
        let db_path = dir.path().join("cards.db");
        let mut settings = SettingsStore::load(dir.path().join("settings.json")).unwrap();
        migrations::ensure_up_to_date(&db_path, &mut settings).unwrap();
        Database::new(db_path).unwrap()
    }

    fn sample_card() -> NewCard {
        NewCard {
            name: String::from("Fireball"),
            rarity: Rarity::Rare,
            card_type: Some(String::from("spell")),
            side: Side::Ally,
            cost: 3,
            ally_effect: EffectProfile {
                damage: 6,
                ..EffectProfile::default()
            },
            enemy_effect: EffectProfile::default(),
            action_script: Some(String::from("burn(target, 2)")),
            image_path: Some(String::from("/img/fireball.png")),
        }
    }

    #[test]
    fn test_create_and_get() {
        let dir = tempdir().unwrap();
        let repo = CardRepository::new(setup(&dir));

        let created = repo.create(&sample_card()).unwrap();
        assert_eq!(created.name, "Fireball");
        assert_eq!(created.rarity, Rarity::Rare);
        assert_eq!(created.ally_effect.damage, 6);
        // Original pointer starts at the illustration
        assert_eq!(
            created.original_image_path,
            Some(String::from("/img/fireball.png"))
        );
        // Layout columns take their region defaults
        assert_eq!(created.title_layout, TextRegion::Title.default_layout());
        assert_eq!(created.body_layout, TextRegion::Body.default_layout());

        let fetched = repo.get(created.id).unwrap().unwrap();
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.ally_effect, created.ally_effect);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let repo = CardRepository::new(setup(&dir));
        assert!(repo.get(12345).unwrap().is_none());
    }

    #[test]
    fn test_update_layout_and_effects() {
        let dir = tempdir().unwrap();
        let repo = CardRepository::new(setup(&dir));
        let mut card = repo.create(&sample_card()).unwrap();

        card.cost = 4;
        card.enemy_effect.shield = 2;
        card.title_layout.offset_y = 24;
        card.title_layout.align = TextAlign::Left;
        repo.update(&card).unwrap();

        let fetched = repo.get(card.id).unwrap().unwrap();
        assert_eq!(fetched.cost, 4);
        assert_eq!(fetched.enemy_effect.shield, 2);
        assert_eq!(fetched.title_layout.offset_y, 24);
        assert_eq!(fetched.title_layout.align, TextAlign::Left);
    }

    #[test]
    fn test_update_missing_card_fails() {
        let dir = tempdir().unwrap();
        let repo = CardRepository::new(setup(&dir));
        let mut card = repo.create(&sample_card()).unwrap();
        repo.delete(card.id).unwrap();

        card.name = String::from("Ghost");
        assert!(repo.update(&card).is_err());
    }

    #[test]
    fn test_list_by_rarity() {
        let dir = tempdir().unwrap();
        let repo = CardRepository::new(setup(&dir));
        repo.create(&sample_card()).unwrap();
        repo.create(&NewCard {
            name: String::from("Pebble"),
            rarity: Rarity::Common,
            ..NewCard::default()
        })
        .unwrap();

        let rares = repo.list_by_rarity(Rarity::Rare).unwrap();
        assert_eq!(rares.len(), 1);
        assert_eq!(rares[0].name, "Fireball");
        assert_eq!(repo.list().unwrap().len(), 2);
    }

    #[test]
    fn test_actor_links_follow_card_deletion() {
        let dir = tempdir().unwrap();
        let db = setup(&dir);
        let repo = CardRepository::new(db.clone());
        let card = repo.create(&sample_card()).unwrap();

        // The seeded default actors exist after migration
        let actor_id: i64 = db
            .with_connection_raw(|conn| {
                conn.query_row("SELECT id FROM actors WHERE name = 'Player'", [], |row| {
                    row.get(0)
                })
            })
            .unwrap();

        repo.set_actors(card.id, &[actor_id]).unwrap();
        assert_eq!(repo.actors_for(card.id).unwrap().len(), 1);

        repo.delete(card.id).unwrap();
        let remaining: i64 = db
            .with_connection_raw(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM card_actors WHERE card_id = ?1",
                    params![card.id],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
