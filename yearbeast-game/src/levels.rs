//! Level progression: beast HP, clear rewards, and preview info.
use serde::{Deserialize, Serialize};

use crate::config::LevelCurveConfig;

/// Display and balance data for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub hp: u64,
    pub name: String,
    pub description: String,
    pub reward: u64,
}

struct NamedLevel {
    name: &'static str,
    description: &'static str,
    reward: u64,
}

const NAMED_LEVELS: [NamedLevel; 5] = [
    NamedLevel {
        name: "初級年獸",
        description: "剛剛甦醒的年獸",
        reward: 50,
    },
    NamedLevel {
        name: "憤怒年獸",
        description: "開始發怒的年獸",
        reward: 75,
    },
    NamedLevel {
        name: "狂暴年獸",
        description: "進入狂暴狀態",
        reward: 100,
    },
    NamedLevel {
        name: "強化年獸",
        description: "力量大幅提升",
        reward: 125,
    },
    NamedLevel {
        name: "霸主年獸",
        description: "年獸之王",
        reward: 150,
    },
];

/// Maps a level number to its beast HP and clear reward.
///
/// Levels start at 1. A level of 0 is treated as level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelCurve {
    cfg: LevelCurveConfig,
}

impl LevelCurve {
    #[must_use]
    pub const fn new(cfg: LevelCurveConfig) -> Self {
        Self { cfg }
    }

    #[must_use]
    pub const fn config(&self) -> &LevelCurveConfig {
        &self.cfg
    }

    /// `base_hp + (level - 1) * hp_increment`
    #[must_use]
    pub fn max_hp_for(&self, level: u32) -> u64 {
        let steps = u64::from(level.max(1) - 1);
        self.cfg
            .base_hp
            .saturating_add(steps.saturating_mul(self.cfg.hp_increment))
    }

    /// Levels 1 to 5 pay their fixed table reward; later levels pay
    /// `reward_base + level * reward_per_level`.
    #[must_use]
    pub fn reward_for(&self, level: u32) -> u64 {
        named_level(level).map_or_else(
            || {
                self.cfg
                    .reward_base
                    .saturating_add(u64::from(level).saturating_mul(self.cfg.reward_per_level))
            },
            |named| named.reward,
        )
    }

    /// Taps needed to clear `level` when every hit deals `damage_per_hit`.
    #[must_use]
    pub fn firecrackers_needed(&self, level: u32, damage_per_hit: u64) -> u64 {
        self.max_hp_for(level).div_ceil(damage_per_hit.max(1))
    }

    #[must_use]
    pub fn level_info(&self, level: u32) -> LevelInfo {
        let level = level.max(1);
        match named_level(level) {
            Some(named) => LevelInfo {
                level,
                hp: self.max_hp_for(level),
                name: named.name.to_string(),
                description: named.description.to_string(),
                reward: named.reward,
            },
            None => LevelInfo {
                level,
                hp: self.max_hp_for(level),
                name: format!("第 {level} 級年獸"),
                description: String::from("更加強大的年獸"),
                reward: self.reward_for(level),
            },
        }
    }
}

fn named_level(level: u32) -> Option<&'static NamedLevel> {
    let idx = usize::try_from(level.checked_sub(1)?).ok()?;
    NAMED_LEVELS.get(idx)
}
