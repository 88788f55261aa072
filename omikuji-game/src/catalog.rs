//! Fortune levels, their draw weights, and the per-category messages.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

const DEFAULT_FORTUNE_DATA: &str = include_str!("../data/fortunes.json");
const DEFAULT_REQUIRED_SHAKES: u32 = 15;
const FALLBACK_LEVEL_ID: &str = "kichi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wishes,
    Love,
    Health,
    Business,
    Studies,
    Travel,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Wishes,
        Self::Love,
        Self::Health,
        Self::Business,
        Self::Studies,
        Self::Travel,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wishes => "wishes",
            Self::Love => "love",
            Self::Health => "health",
            Self::Business => "business",
            Self::Studies => "studies",
            Self::Travel => "travel",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneLevel {
    pub id: String,
    pub japanese: String,
    pub english: String,
    /// Relative draw weight.
    pub weight: u32,
    #[serde(default = "FortuneLevel::default_color")]
    pub color: String,
}

impl FortuneLevel {
    fn default_color() -> String {
        String::from("#000000")
    }

    fn builtin(id: &str, japanese: &str, english: &str, weight: u32, color: &str) -> Self {
        Self {
            id: id.to_string(),
            japanese: japanese.to_string(),
            english: english.to_string(),
            weight,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneCatalog {
    #[serde(default = "FortuneCatalog::default_required_shakes")]
    pub required_shakes: u32,
    pub levels: Vec<FortuneLevel>,
    #[serde(default)]
    pub messages: BTreeMap<Category, BTreeMap<String, String>>,
}

impl Default for FortuneCatalog {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_FORTUNE_DATA).unwrap_or_else(|err| {
            log::error!("embedded fortune data is invalid: {err}");
            Self::levels_only()
        })
    }
}

impl FortuneCatalog {
    const fn default_required_shakes() -> u32 {
        DEFAULT_REQUIRED_SHAKES
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The traditional six levels with no messages.
    fn levels_only() -> Self {
        Self {
            required_shakes: DEFAULT_REQUIRED_SHAKES,
            levels: vec![
                FortuneLevel::builtin("daikichi", "大吉", "Great Fortune", 15, "#CC0000"),
                FortuneLevel::builtin("kichi", "吉", "Good Fortune", 25, "#D4AF37"),
                FortuneLevel::builtin("chukichi", "中吉", "Middle Fortune", 20, "#FF6B6B"),
                FortuneLevel::builtin("shokichi", "小吉", "Small Fortune", 20, "#FFA500"),
                FortuneLevel::builtin("suekichi", "末吉", "Future Fortune", 15, "#4A90E2"),
                FortuneLevel::builtin("kyo", "凶", "Bad Fortune", 5, "#666666"),
            ],
            messages: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn level(&self, id: &str) -> Option<&FortuneLevel> {
        self.levels.iter().find(|level| level.id == id)
    }

    #[must_use]
    pub fn total_weight(&self) -> u64 {
        self.levels.iter().map(|level| u64::from(level.weight)).sum()
    }

    /// Level used when a draw cannot pick one by weight.
    #[must_use]
    pub fn fallback_level(&self) -> Option<&FortuneLevel> {
        self.level(FALLBACK_LEVEL_ID).or_else(|| self.levels.first())
    }

    #[must_use]
    pub fn message(&self, category: Category, level_id: &str) -> Option<&str> {
        self.messages
            .get(&category)
            .and_then(|by_level| by_level.get(level_id))
            .map(String::as_str)
    }

    #[must_use]
    pub fn color(&self, level_id: &str) -> &str {
        self.level(level_id).map_or("#000000", |level| level.color.as_str())
    }
}

/// The shipped catalog, parsed once.
#[must_use]
pub fn catalog() -> &'static FortuneCatalog {
    static CATALOG: OnceLock<FortuneCatalog> = OnceLock::new();
    CATALOG.get_or_init(FortuneCatalog::load_from_static)
}
