// Actor model
// Named entities that cards can be associated with, replacing the legacy
// two-valued side classification

use serde::{Deserialize, Serialize};

/// A named actor ("Player", "AI", "Boss"). Cards relate to actors through
/// the card_actors link table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Default actor seeded for cards that carried the legacy `ally` side
pub const DEFAULT_ALLY_ACTOR: &str = "Player";

/// Default actor seeded for cards that carried the legacy `enemy` side
pub const DEFAULT_ENEMY_ACTOR: &str = "Enemy";
