use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::play_date_string;
use crate::config::GameConfig;
use crate::levels::LevelCurve;
use crate::tasks::{TaskLedger, default_tasks};

/// Where the current beast stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encounter {
    Alive,
    /// Transient: must be followed by a level advance.
    Defeated,
}

/// The complete persisted game aggregate.
///
/// JSON keys match the browser save format so existing saves keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(rename = "firecrackers")]
    pub currency: u64,
    #[serde(rename = "totalClicks")]
    pub total_actions: u64,
    pub level: u32,
    #[serde(rename = "beastHP")]
    pub boss_hp: u64,
    #[serde(rename = "beastMaxHP")]
    pub boss_max_hp: u64,
    pub tasks: TaskLedger,
    #[serde(rename = "soundEnabled")]
    pub sound_enabled: bool,
    #[serde(rename = "musicEnabled")]
    pub music_enabled: bool,
    #[serde(rename = "lastPlayDate")]
    pub last_play_date: String,
}

impl GameState {
    /// A brand-new save as of `today`.
    #[must_use]
    pub fn fresh(cfg: &GameConfig, today: NaiveDate) -> Self {
        let curve = LevelCurve::new(cfg.levels);
        let max_hp = curve.max_hp_for(1);
        Self {
            currency: cfg.starting_currency,
            total_actions: 0,
            level: 1,
            boss_hp: max_hp,
            boss_max_hp: max_hp,
            tasks: TaskLedger::default(),
            sound_enabled: true,
            music_enabled: true,
            last_play_date: play_date_string(today),
        }
    }

    /// Decode a saved snapshot, filling missing (or `null`) fields from
    /// `defaults`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not a JSON object or a present
    /// field has the wrong shape.
    pub fn from_snapshot(snapshot: &str, defaults: &Self) -> Result<Self, serde_json::Error> {
        let saved: Map<String, Value> = serde_json::from_str(snapshot)?;
        let mut merged = match serde_json::to_value(defaults)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in saved {
            if !value.is_null() {
                merged.insert(key, value);
            }
        }
        serde_json::from_value(Value::Object(merged))
    }

    /// Full JSON snapshot as written to storage.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization itself fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Re-establish the level and HP invariants after loading.
    pub fn normalize(&mut self, curve: &LevelCurve) {
        self.level = self.level.max(1);
        self.boss_max_hp = curve.max_hp_for(self.level);
        self.boss_hp = self.boss_hp.min(self.boss_max_hp);
    }

    /// Swap in a fresh task set if the save was last played on another day.
    /// Returns whether a reset happened.
    pub fn roll_daily_tasks(&mut self, today: NaiveDate) -> bool {
        let today = play_date_string(today);
        if self.last_play_date == today {
            return false;
        }
        self.tasks = TaskLedger::from(default_tasks());
        self.last_play_date = today;
        true
    }

    #[must_use]
    pub const fn encounter(&self) -> Encounter {
        if self.boss_hp == 0 {
            Encounter::Defeated
        } else {
            Encounter::Alive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    #[test]
    fn fresh_state_uses_config() {
        let state = GameState::fresh(&GameConfig::standard(), day(17));
        assert_eq!(state.currency, 5_000);
        assert_eq!(state.level, 1);
        assert_eq!(state.boss_hp, 1_000);
        assert_eq!(state.boss_max_hp, 1_000);
        assert_eq!(state.tasks.len(), 3);
        assert_eq!(state.last_play_date, "Tue Feb 17 2026");
        assert_eq!(state.encounter(), Encounter::Alive);
    }

    #[test]
    fn snapshot_uses_browser_keys() {
        let state = GameState::fresh(&GameConfig::standard(), day(17));
        let value: Value = serde_json::from_str(&state.to_snapshot().unwrap()).unwrap();
        for key in [
            "firecrackers",
            "totalClicks",
            "level",
            "beastHP",
            "beastMaxHP",
            "tasks",
            "soundEnabled",
            "musicEnabled",
            "lastPlayDate",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn partial_snapshot_merges_defaults() {
        let defaults = GameState::fresh(&GameConfig::standard(), day(17));
        let state =
            GameState::from_snapshot(r#"{"firecrackers": 12, "tasks": null}"#, &defaults).unwrap();
        assert_eq!(state.currency, 12);
        assert_eq!(state.level, 1);
        assert_eq!(state.tasks, defaults.tasks);
        assert!(state.sound_enabled);
    }

    #[test]
    fn non_object_snapshot_is_rejected() {
        let defaults = GameState::fresh(&GameConfig::standard(), day(17));
        assert!(GameState::from_snapshot("[1,2,3]", &defaults).is_err());
        assert!(GameState::from_snapshot(r#"{"firecrackers": -5}"#, &defaults).is_err());
    }

    #[test]
    fn normalize_recomputes_max_hp_and_clamps() {
        let mut state = GameState::fresh(&GameConfig::standard(), day(17));
        state.level = 3;
        state.boss_max_hp = 10;
        state.boss_hp = 9_999;
        state.normalize(&LevelCurve::default());
        assert_eq!(state.boss_max_hp, 2_000);
        assert_eq!(state.boss_hp, 2_000);
    }

    #[test]
    fn daily_roll_only_on_new_date() {
        let mut state = GameState::fresh(&GameConfig::standard(), day(17));
        state.tasks.advance("click_100", 40);
        assert!(!state.roll_daily_tasks(day(17)));
        assert_eq!(state.tasks.get("click_100").unwrap().progress, 40);
        assert!(state.roll_daily_tasks(day(18)));
        assert_eq!(state.tasks.get("click_100").unwrap().progress, 0);
        assert_eq!(state.last_play_date, "Wed Feb 18 2026");
    }
}
