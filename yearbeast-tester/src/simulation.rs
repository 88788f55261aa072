use chrono::NaiveDate;
use serde::Serialize;
use yearbeast_game::{
    Clock, GameConfig, GameStorage, HitResult, ManualClock, Session, StateStore, check_integrity,
    snapshot_checksum, verify_checksum,
};

/// Parameters for one scripted play session.
#[derive(Debug, Clone, Copy)]
pub struct PlayConfig {
    pub seed: u64,
    pub levels: u32,
    pub tap_interval_ms: u64,
    pub max_taps: u64,
}

impl PlayConfig {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            levels: 3,
            tap_interval_ms: 200,
            max_taps: 50_000,
        }
    }

    #[must_use]
    pub const fn with_levels(mut self, levels: u32) -> Self {
        self.levels = levels;
        self
    }

    #[must_use]
    pub const fn with_tap_interval(mut self, tap_interval_ms: u64) -> Self {
        self.tap_interval_ms = tap_interval_ms;
        self
    }
}

/// Everything observed during one scripted session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayRecord {
    pub seed: u64,
    pub levels_cleared: u32,
    pub final_level: u32,
    pub taps: u64,
    pub hits: u64,
    pub critical_hits: u64,
    pub rate_limited: u64,
    pub ran_dry: bool,
    pub seconds_played: u64,
    pub tasks_claimed: Vec<String>,
    pub task_rewards: u64,
    pub currency_left: u64,
    pub checksum: String,
    pub failures: Vec<String>,
}

impl PlayRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn critical_rate(&self) -> f64 {
        if self.hits == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.critical_hits as f64 / self.hits as f64;
        rate
    }
}

fn session_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 17).unwrap_or_default()
}

/// Tap the beast at a fixed cadence until the requested number of levels is
/// cleared, the firecrackers run out, or `max_taps` is reached; then claim
/// every finished task and check the saved state.
pub fn run_play<S>(storage: S, config: &GameConfig, play: PlayConfig) -> PlayRecord
where
    S: GameStorage + Clone,
{
    let clock = ManualClock::new(session_date(), 0);
    let mut session = Session::start(storage.clone(), clock.clone(), config.clone(), play.seed);
    let mut record = PlayRecord {
        seed: play.seed,
        ..PlayRecord::default()
    };

    while record.levels_cleared < play.levels && record.taps < play.max_taps {
        clock.advance_millis(play.tap_interval_ms);
        let now = clock.now_millis();
        session.tick(now);
        record.taps += 1;
        match session.hit(now) {
            HitResult::RateLimited => record.rate_limited += 1,
            HitResult::OutOfCurrency => {
                record.ran_dry = true;
                break;
            }
            HitResult::Hit { outcome, defeated } => {
                record.hits += 1;
                if outcome.is_critical {
                    record.critical_hits += 1;
                }
                if defeated && session.finish_encounter().is_some() {
                    record.levels_cleared += 1;
                }
            }
        }
    }

    let before_claims = session.store().state().currency;
    for view in session.store().task_views() {
        if view.can_claim && session.claim(&view.id) {
            record.tasks_claimed.push(view.id);
        }
    }

    let state = session.store().state();
    record.task_rewards = state.currency.saturating_sub(before_claims);
    record.final_level = state.level;
    record.currency_left = state.currency;
    record.seconds_played = clock.now_millis() / 1_000;
    record.checksum = snapshot_checksum(state);
    record.failures = audit(&session, &storage, &clock, config, &record.checksum);
    log::debug!(
        "seed {} cleared {} levels in {} taps",
        play.seed,
        record.levels_cleared,
        record.taps
    );
    record
}

fn audit<S>(
    session: &Session<S, ManualClock>,
    storage: &S,
    clock: &ManualClock,
    config: &GameConfig,
    checksum: &str,
) -> Vec<String>
where
    S: GameStorage + Clone,
{
    let mut failures = Vec::new();
    let store = session.store();
    let state = store.state();

    if let Err(err) = check_integrity(state, &config.integrity, store.curve()) {
        failures.push(format!("final state implausible: {err}"));
    }
    if state.boss_hp > state.boss_max_hp {
        failures.push(format!(
            "beast hp {} above max {}",
            state.boss_hp, state.boss_max_hp
        ));
    }
    if let Some(task) = state.tasks.iter().find(|task| task.progress > task.target) {
        failures.push(format!(
            "task {} progress {} past target {}",
            task.id, task.progress, task.target
        ));
    }

    let reloaded = StateStore::load(storage.clone(), clock.clone(), config.clone());
    if reloaded.state() != state {
        failures.push("reloaded state differs from the live state".to_string());
    }
    if !verify_checksum(reloaded.state(), checksum) {
        failures.push("checksum mismatch after reload".to_string());
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use yearbeast_game::{FileStorage, MemoryStorage};

    #[test]
    fn human_pace_clears_levels_without_throttling() {
        let record = run_play(
            MemoryStorage::new(),
            &GameConfig::standard(),
            PlayConfig::new(42).with_levels(2),
        );
        assert!(record.passed(), "{:?}", record.failures);
        assert_eq!(record.levels_cleared, 2);
        assert_eq!(record.final_level, 3);
        assert_eq!(record.rate_limited, 0);
        assert!(!record.ran_dry);
        assert_eq!(record.tasks_claimed.len(), 3);
        assert_eq!(record.task_rewards, 180);
    }

    #[test]
    fn frantic_tapping_is_throttled() {
        let record = run_play(
            MemoryStorage::new(),
            &GameConfig::standard(),
            PlayConfig::new(7).with_levels(1).with_tap_interval(20),
        );
        assert!(record.passed(), "{:?}", record.failures);
        assert!(record.rate_limited > 0);
        assert_eq!(record.hits + record.rate_limited, record.taps);
    }

    #[test]
    fn small_purse_runs_dry() {
        let config = GameConfig {
            starting_currency: 30,
            ..GameConfig::standard()
        };
        let record = run_play(MemoryStorage::new(), &config, PlayConfig::new(1));
        assert!(record.ran_dry);
        assert_eq!(record.levels_cleared, 0);
        assert_eq!(record.hits, 30);
        assert!(record.passed(), "{:?}", record.failures);
    }

    #[test]
    fn file_storage_round_trips() {
        let root = std::env::temp_dir().join(format!(
            "yearbeast-sim-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let record = run_play(
            FileStorage::new(&root),
            &GameConfig::standard(),
            PlayConfig::new(3).with_levels(1),
        );
        assert!(record.passed(), "{:?}", record.failures);
        let _ = std::fs::remove_dir_all(root);
    }
}
