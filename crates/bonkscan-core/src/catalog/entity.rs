use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Game-data category an entity belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Item,
    Weapon,
    Tome,
    Character,
    Shrine,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Item,
        EntityKind::Weapon,
        EntityKind::Tome,
        EntityKind::Character,
        EntityKind::Shrine,
    ];

    /// Key of the collection holding this kind in game data (`items`, `weapons`, ...).
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Item => "items",
            EntityKind::Weapon => "weapons",
            EntityKind::Tome => "tomes",
            EntityKind::Character => "characters",
            EntityKind::Shrine => "shrines",
        }
    }

    /// Case-insensitive parse of a singular kind name (`"weapon"`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Item => "item",
            EntityKind::Weapon => "weapon",
            EntityKind::Tome => "tome",
            EntityKind::Character => "character",
            EntityKind::Shrine => "shrine",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item rarity as shown by the colored frame around an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Case-insensitive parse; anything unrecognized is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "epic" => Some(Rarity::Epic),
            "legendary" => Some(Rarity::Legendary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognizable game entity. Immutable once it is in a [`CatalogIndex`](super::CatalogIndex).
///
/// A `type` value naming one of the five kinds sets `kind`. Any other `type`
/// (`"ranged"`, `"stat_upgrade"`) is a domain attribute and stays in
/// `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EntityRecord", into = "EntityRecord")]
pub struct CatalogEntity {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    pub rarity: Option<Rarity>,
    pub tier: Option<String>,
    /// Icon path relative to the image root, as written by the image scraper.
    pub image: Option<String>,
    /// Domain attributes the pipeline does not interpret (stats, descriptions, ...).
    pub attributes: Map<String, Value>,
}

/// Wire shape of [`CatalogEntity`]; `type` lives in the attribute map.
#[derive(Serialize, Deserialize)]
struct EntityRecord {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "lenient_rarity")]
    rarity: Option<Rarity>,
    #[serde(default, deserialize_with = "lenient_tier")]
    tier: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl From<EntityRecord> for CatalogEntity {
    fn from(mut record: EntityRecord) -> Self {
        let kind = record
            .attributes
            .get("type")
            .and_then(Value::as_str)
            .and_then(EntityKind::parse);
        if kind.is_some() {
            record.attributes.remove("type");
        }
        Self {
            id: record.id,
            name: record.name,
            kind: kind.unwrap_or_default(),
            rarity: record.rarity,
            tier: record.tier,
            image: record.image,
            attributes: record.attributes,
        }
    }
}

impl From<CatalogEntity> for EntityRecord {
    fn from(entity: CatalogEntity) -> Self {
        let mut attributes = entity.attributes;
        if !attributes.contains_key("type") {
            attributes.insert("type".to_string(), Value::from(entity.kind.as_str()));
        }
        Self {
            id: entity.id,
            name: entity.name,
            rarity: entity.rarity,
            tier: entity.tier,
            image: entity.image,
            attributes,
        }
    }
}

impl CatalogEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            rarity: None,
            tier: None,
            image: None,
            attributes: Map::new(),
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

fn lenient_rarity<'de, D>(deserializer: D) -> Result<Option<Rarity>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(Rarity::parse))
}

// Tiers show up both as letters ("S") and as numbers (1).
fn lenient_tier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
