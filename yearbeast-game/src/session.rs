//! A running play session: one store plus the per-session input guard,
//! hit RNG, and stay timer.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::combat::{HitOutcome, resolve_hit};
use crate::config::GameConfig;
use crate::constants::{STAY_TICK_MS, TASK_DAILY_LOGIN, TASK_STAY};
use crate::guard::ClickRateGuard;
use crate::state::Encounter;
use crate::storage::GameStorage;
use crate::store::StateStore;

/// What happened to a single tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitResult {
    /// Dropped by the input rate guard; nothing was spent.
    RateLimited,
    /// Not enough firecrackers; nothing was spent.
    OutOfCurrency,
    Hit { outcome: HitOutcome, defeated: bool },
}

impl HitResult {
    #[must_use]
    pub const fn defeated(&self) -> bool {
        matches!(self, Self::Hit { defeated: true, .. })
    }
}

/// Tracks time spent in the app for the stay-duration task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayTimer {
    started_at: u64,
    active: bool,
}

impl StayTimer {
    #[must_use]
    pub const fn start(now_millis: u64) -> Self {
        Self {
            started_at: now_millis,
            active: true,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn elapsed_secs(&self, now_millis: u64) -> u32 {
        let secs = now_millis.saturating_sub(self.started_at) / STAY_TICK_MS;
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    pub fn stop(&mut self) {
        self.active = false;
    }
}

pub struct Session<S, C>
where
    S: GameStorage,
    C: Clock,
{
    store: StateStore<S, C>,
    guard: ClickRateGuard,
    rng: ChaCha20Rng,
    stay: StayTimer,
}

impl<S, C> Session<S, C>
where
    S: GameStorage,
    C: Clock,
{
    /// Load the save, mark today's login, and start the stay timer.
    pub fn start(storage: S, clock: C, config: GameConfig, seed: u64) -> Self {
        let store = StateStore::load(storage, clock, config);
        Self::from_store(store, seed)
    }

    pub fn from_store(mut store: StateStore<S, C>, seed: u64) -> Self {
        let guard = ClickRateGuard::from_config(&store.config().rate_limit);
        let now = store.clock().now_millis();
        store.progress_task(TASK_DAILY_LOGIN, 1);
        Self {
            store,
            guard,
            rng: ChaCha20Rng::seed_from_u64(seed),
            stay: StayTimer::start(now),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &StateStore<S, C> {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut StateStore<S, C> {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> StateStore<S, C> {
        self.store
    }

    #[must_use]
    pub const fn stay_timer(&self) -> &StayTimer {
        &self.stay
    }

    /// Handle one tap on the beast at `now_millis`.
    ///
    /// The caller is expected to follow a defeat with
    /// [`Self::finish_encounter`] once any death sequence has played.
    pub fn hit(&mut self, now_millis: u64) -> HitResult {
        if !self.guard.admit(now_millis) {
            return HitResult::RateLimited;
        }
        let cost = self.store.config().combat.cost_per_hit;
        if !self.store.consume_currency(cost) {
            return HitResult::OutOfCurrency;
        }
        let outcome = resolve_hit(&self.store.config().combat, &mut self.rng);
        let defeated = self.store.apply_damage(outcome.damage);
        HitResult::Hit { outcome, defeated }
    }

    /// Advance past a defeated beast. Returns the level now in play, or
    /// `None` if the current beast is still alive.
    pub fn finish_encounter(&mut self) -> Option<u32> {
        match self.store.encounter() {
            Encounter::Defeated => {
                self.store.advance_level();
                Some(self.store.state().level)
            }
            Encounter::Alive => None,
        }
    }

    /// Drive the stay timer; call roughly once per second.
    ///
    /// Sets the stay task's progress to whole seconds elapsed since the
    /// session started, and stops once the task reaches its target or is
    /// already claimed.
    pub fn tick(&mut self, now_millis: u64) {
        if !self.stay.is_active() {
            return;
        }
        let open = self
            .store
            .state()
            .tasks
            .get(TASK_STAY)
            .filter(|task| !task.completed && task.progress < task.target)
            .is_some();
        if open {
            let elapsed = self.stay.elapsed_secs(now_millis);
            self.store.set_task_progress_at_least(TASK_STAY, elapsed);
        }
        let finished = self
            .store
            .state()
            .tasks
            .get(TASK_STAY)
            .is_none_or(|task| task.completed || task.progress >= task.target);
        if finished {
            self.stay.stop();
        }
    }

    pub fn claim(&mut self, task_id: &str) -> bool {
        self.store.claim_task(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::CombatConfig;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn session_with(combat: CombatConfig) -> Session<MemoryStorage, ManualClock> {
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(), 10_000);
        let config = GameConfig {
            combat,
            ..GameConfig::standard()
        };
        Session::start(MemoryStorage::new(), clock, config, 99)
    }

    #[test]
    fn start_marks_daily_login() {
        let session = session_with(CombatConfig::default());
        let login = session.store().state().tasks.get("daily_login").unwrap();
        assert_eq!(login.progress, 1);
        assert!(login.is_ready());
    }

    #[test]
    fn rapid_taps_are_throttled_without_spending() {
        let mut session = session_with(CombatConfig::default());
        for i in 0..10 {
            assert!(matches!(session.hit(10_000 + i), HitResult::Hit { .. }));
        }
        assert_eq!(session.hit(10_011), HitResult::RateLimited);
        assert_eq!(session.store().state().currency, 4_990);
    }

    #[test]
    fn out_of_currency_does_not_damage() {
        let mut session = session_with(CombatConfig::default());
        session.store_mut().reset();
        let spend = session.store().state().currency;
        assert!(session.store_mut().consume_currency(spend));
        assert_eq!(session.hit(50_000), HitResult::OutOfCurrency);
        assert_eq!(session.store().state().boss_hp, 1_000);
    }

    #[test]
    fn defeat_and_finish_encounter() {
        let mut session = session_with(CombatConfig {
            base_damage: 500,
            critical_chance: 0.0,
            ..CombatConfig::default()
        });
        assert_eq!(session.finish_encounter(), None);
        assert!(!session.hit(20_000).defeated());
        assert!(session.hit(21_000).defeated());
        assert_eq!(session.finish_encounter(), Some(2));
        assert_eq!(session.store().state().boss_hp, 1_500);
    }

    #[test]
    fn stay_timer_counts_seconds_and_stops_at_target() {
        let mut session = session_with(CombatConfig::default());
        session.tick(10_999);
        assert_eq!(session.store().state().tasks.get("stay_15s").unwrap().progress, 0);
        session.tick(14_000);
        assert_eq!(session.store().state().tasks.get("stay_15s").unwrap().progress, 4);
        session.tick(40_000);
        assert_eq!(session.store().state().tasks.get("stay_15s").unwrap().progress, 15);
        assert!(!session.stay_timer().is_active());
        assert!(session.claim("stay_15s"));
        assert_eq!(session.store().state().currency, 5_030);
    }
}
