// Card models
// The card row shape, its enums, and the per-region text layout metadata

use serde::{Deserialize, Serialize};

/// Card rarity tiers. Each tier has its own overlay template image that is
/// composited with the card illustration at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// Parse a stored rarity value. Unknown or empty values fall back to
    /// `Common`, matching how the rarity-normalization migration treats them.
    pub fn parse(s: &str) -> Rarity {
        match s {
            "rare" => Rarity::Rare,
            "epic" => Rarity::Epic,
            "legendary" => Rarity::Legendary,
            _ => Rarity::Common,
        }
    }
}

/// Legacy two-valued card classification, kept for backward compatibility.
/// Superseded by the actors association but still stored on every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Ally => "ally",
            Side::Enemy => "enemy",
        }
    }

    pub fn parse(s: &str) -> Side {
        match s {
            "enemy" => Side::Enemy,
            _ => Side::Ally,
        }
    }
}

/// Gameplay stat blob, stored as a JSON text column. Every card carries two
/// symmetric profiles, one applied to the ally side and one to the enemy side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectProfile {
    pub damage: i32,
    pub heal: i32,
    pub shield: i32,
    pub draw: i32,
    pub duration: i32,
}

impl EffectProfile {
    /// Tolerant decode for legacy rows; anything unreadable becomes the
    /// neutral profile.
    pub fn from_json(raw: &str) -> EffectProfile {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

/// Horizontal alignment of a text region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    pub fn parse(s: &str) -> TextAlign {
        match s {
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

/// Layout metadata for one text region on the card face
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayout {
    pub offset_x: i32,
    pub offset_y: i32,
    pub font: String,
    pub font_size: i32,
    pub color: String,
    pub align: TextAlign,
    pub wrap_width: i32,
}

/// Column name suffixes for the flattened layout columns, in declaration
/// order. The full column name is `<region prefix>_<suffix>`.
pub const LAYOUT_FIELDS: [&str; 7] = [
    "offset_x",
    "offset_y",
    "font",
    "font_size",
    "color",
    "align",
    "wrap_width",
];

/// The three independently positioned text regions on a card face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRegion {
    Title,
    Body,
    Cost,
}

impl TextRegion {
    pub const ALL: [TextRegion; 3] = [TextRegion::Title, TextRegion::Body, TextRegion::Cost];

    /// Prefix used for this region's columns in the cards table
    pub fn column_prefix(&self) -> &'static str {
        match self {
            TextRegion::Title => "title",
            TextRegion::Body => "body",
            TextRegion::Cost => "cost",
        }
    }

    /// Defaults matching the renderer's behavior before layout became
    /// configurable. The layout migration bakes these into the column
    /// defaults so existing rows keep rendering unchanged.
    pub fn default_layout(&self) -> TextLayout {
        match self {
            TextRegion::Title => TextLayout {
                offset_x: 16,
                offset_y: 10,
                font: String::from("sans-bold"),
                font_size: 18,
                color: String::from("#ffffff"),
                align: TextAlign::Center,
                wrap_width: 224,
            },
            TextRegion::Body => TextLayout {
                offset_x: 16,
                offset_y: 120,
                font: String::from("sans"),
                font_size: 12,
                color: String::from("#e8e8e8"),
                align: TextAlign::Left,
                wrap_width: 224,
            },
            TextRegion::Cost => TextLayout {
                offset_x: 208,
                offset_y: 10,
                font: String::from("sans-bold"),
                font_size: 16,
                color: String::from("#ffd700"),
                align: TextAlign::Center,
                wrap_width: 32,
            },
        }
    }
}

/// A fully loaded card row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub rarity: Rarity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    pub side: Side,
    pub cost: i32,
    pub ally_effect: EffectProfile,
    pub enemy_effect: EffectProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_script: Option<String>,
    /// Composited output image, overwritten on re-export
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Untouched source illustration, never overwritten by compositing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_image_path: Option<String>,
    pub title_layout: TextLayout,
    pub body_layout: TextLayout,
    pub cost_layout: TextLayout,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for creating a new card; the database assigns id, timestamps and
/// layout defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub name: String,
    pub rarity: Rarity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    pub side: Side,
    pub cost: i32,
    pub ally_effect: EffectProfile,
    pub enemy_effect: EffectProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl Default for NewCard {
    fn default() -> Self {
        Self {
            name: String::new(),
            rarity: Rarity::Common,
            card_type: None,
            side: Side::Ally,
            cost: 0,
            ally_effect: EffectProfile::default(),
            enemy_effect: EffectProfile::default(),
            action_script: None,
            image_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_round_trip() {
        for rarity in Rarity::ALL {
            assert_eq!(Rarity::parse(rarity.as_str()), rarity);
        }
        assert_eq!(Rarity::parse(""), Rarity::Common);
        assert_eq!(Rarity::parse("mythic"), Rarity::Common);
    }

    #[test]
    fn test_effect_profile_tolerant_decode() {
        assert_eq!(EffectProfile::from_json("{}"), EffectProfile::default());
        assert_eq!(EffectProfile::from_json("not json"), EffectProfile::default());

        let profile = EffectProfile::from_json(r#"{"damage":3,"draw":1}"#);
        assert_eq!(profile.damage, 3);
        assert_eq!(profile.draw, 1);
        assert_eq!(profile.heal, 0);
    }

    #[test]
    fn test_default_layouts_differ_per_region() {
        let title = TextRegion::Title.default_layout();
        let body = TextRegion::Body.default_layout();
        assert_ne!(title, body);
        assert_eq!(title.align, TextAlign::Center);
        assert_eq!(body.align, TextAlign::Left);
    }
}
