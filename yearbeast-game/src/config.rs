//! Tunable configuration for a Year Beast session.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("{field} must be at most {max} (got {value})")]
    MaxViolation {
        field: &'static str,
        max: u64,
        value: u64,
    },
    #[error("save slot name must not be empty")]
    EmptySaveSlot,
    #[error("config JSON could not be parsed: {0}")]
    Parse(String),
}

/// Damage and critical-hit tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    #[serde(default = "CombatConfig::default_base_damage")]
    pub base_damage: u64,
    #[serde(default = "CombatConfig::default_critical_chance")]
    pub critical_chance: f64,
    #[serde(default = "CombatConfig::default_critical_multiplier")]
    pub critical_multiplier: f64,
    /// Firecrackers spent per tap.
    #[serde(default = "CombatConfig::default_cost_per_hit")]
    pub cost_per_hit: u64,
}

impl CombatConfig {
    const fn default_base_damage() -> u64 {
        constants::DAMAGE_PER_FIRECRACKER
    }

    const fn default_critical_chance() -> f64 {
        constants::CRIT_CHANCE
    }

    const fn default_critical_multiplier() -> f64 {
        constants::CRIT_MULTIPLIER
    }

    const fn default_cost_per_hit() -> u64 {
        constants::FIRECRACKERS_PER_HIT
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            base_damage: Self::default_base_damage(),
            critical_chance: Self::default_critical_chance(),
            critical_multiplier: Self::default_critical_multiplier(),
            cost_per_hit: Self::default_cost_per_hit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "RateLimitConfig::default_max_clicks")]
    pub max_clicks: usize,
    #[serde(default = "RateLimitConfig::default_window_ms")]
    pub window_ms: u64,
}

impl RateLimitConfig {
    const fn default_max_clicks() -> usize {
        constants::MAX_CLICKS_PER_WINDOW
    }

    const fn default_window_ms() -> u64 {
        constants::CLICK_WINDOW_MS
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_clicks: Self::default_max_clicks(),
            window_ms: Self::default_window_ms(),
        }
    }
}

/// Coefficients of the level curve. The defaults are the compatibility values
/// baked into existing saves and level previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCurveConfig {
    #[serde(default = "LevelCurveConfig::default_base_hp")]
    pub base_hp: u64,
    #[serde(default = "LevelCurveConfig::default_hp_increment")]
    pub hp_increment: u64,
    #[serde(default = "LevelCurveConfig::default_reward_base")]
    pub reward_base: u64,
    #[serde(default = "LevelCurveConfig::default_reward_per_level")]
    pub reward_per_level: u64,
}

impl LevelCurveConfig {
    const fn default_base_hp() -> u64 {
        constants::BASE_HP
    }

    const fn default_hp_increment() -> u64 {
        constants::HP_INCREMENT_PER_LEVEL
    }

    const fn default_reward_base() -> u64 {
        constants::REWARD_BASE
    }

    const fn default_reward_per_level() -> u64 {
        constants::REWARD_PER_LEVEL
    }
}

impl Default for LevelCurveConfig {
    fn default() -> Self {
        Self {
            base_hp: Self::default_base_hp(),
            hp_increment: Self::default_hp_increment(),
            reward_base: Self::default_reward_base(),
            reward_per_level: Self::default_reward_per_level(),
        }
    }
}

/// Upper bounds a loaded save must respect to be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityLimits {
    #[serde(default = "IntegrityLimits::default_max_currency")]
    pub max_currency: u64,
    #[serde(default = "IntegrityLimits::default_max_level")]
    pub max_level: u32,
}

impl IntegrityLimits {
    const fn default_max_currency() -> u64 {
        constants::MAX_PLAUSIBLE_CURRENCY
    }

    const fn default_max_level() -> u32 {
        constants::MAX_PLAUSIBLE_LEVEL
    }
}

impl Default for IntegrityLimits {
    fn default() -> Self {
        Self {
            max_currency: Self::default_max_currency(),
            max_level: Self::default_max_level(),
        }
    }
}

/// Top-level configuration consumed by [`crate::StateStore`] and [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_starting_currency")]
    pub starting_currency: u64,
    #[serde(default = "GameConfig::default_save_slot")]
    pub save_slot: String,
    #[serde(default)]
    pub combat: CombatConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub levels: LevelCurveConfig,
    #[serde(default)]
    pub integrity: IntegrityLimits,
}

impl GameConfig {
    const fn default_starting_currency() -> u64 {
        constants::STARTING_CURRENCY
    }

    fn default_save_slot() -> String {
        constants::DEFAULT_SAVE_SLOT.to_string()
    }

    /// Configuration with every field at its shipped default.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            starting_currency: Self::default_starting_currency(),
            save_slot: Self::default_save_slot(),
            combat: CombatConfig::default(),
            rate_limit: RateLimitConfig::default(),
            levels: LevelCurveConfig::default(),
            integrity: IntegrityLimits::default(),
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every invariant the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_slot.trim().is_empty() {
            return Err(ConfigError::EmptySaveSlot);
        }
        let chance = self.combat.critical_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigError::RangeViolation {
                field: "combat.critical_chance",
                min: 0.0,
                max: 1.0,
                value: chance,
            });
        }
        let multiplier = self.combat.critical_multiplier;
        if !(1.0..=1_000.0).contains(&multiplier) {
            return Err(ConfigError::RangeViolation {
                field: "combat.critical_multiplier",
                min: 1.0,
                max: 1_000.0,
                value: multiplier,
            });
        }
        ensure_min("combat.base_damage", 1, self.combat.base_damage)?;
        ensure_min("combat.cost_per_hit", 1, self.combat.cost_per_hit)?;
        ensure_min(
            "rate_limit.max_clicks",
            1,
            u64::try_from(self.rate_limit.max_clicks).unwrap_or(u64::MAX),
        )?;
        ensure_min("rate_limit.window_ms", 1, self.rate_limit.window_ms)?;
        ensure_min("levels.base_hp", 1, self.levels.base_hp)?;
        ensure_min(
            "integrity.max_level",
            1,
            u64::from(self.integrity.max_level),
        )?;
        if self.starting_currency > self.integrity.max_currency {
            return Err(ConfigError::MaxViolation {
                field: "starting_currency",
                max: self.integrity.max_currency,
                value: self.starting_currency,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard()
    }
}

fn ensure_min(field: &'static str, min: u64, value: u64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::MinViolation { field, min, value });
    }
    Ok(())
}
