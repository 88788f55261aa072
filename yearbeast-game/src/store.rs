//! The authoritative owner of [`GameState`].
//!
//! Every mutation goes through a named action on [`StateStore`]. Each action
//! that changes state writes a full snapshot to storage and then notifies
//! subscribers, so listeners always observe state that is already persisted.
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::constants::TASK_CLICKS;
use crate::integrity::check_integrity;
use crate::levels::LevelCurve;
use crate::state::{Encounter, GameState};
use crate::storage::GameStorage;
use crate::tasks::{ClaimRefusal, TaskView};

/// Observer invoked after every state change.
pub type Listener = Box<dyn FnMut(&GameState) -> anyhow::Result<()>>;

/// Handle returned by [`StateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct StateStore<S, C>
where
    S: GameStorage,
    C: Clock,
{
    state: GameState,
    storage: S,
    clock: C,
    config: GameConfig,
    curve: LevelCurve,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<S, C> std::fmt::Debug for StateStore<S, C>
where
    S: GameStorage,
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &self.state)
            .field("slot", &self.config.save_slot)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<S, C> StateStore<S, C>
where
    S: GameStorage,
    C: Clock,
{
    /// Load the saved game, or start fresh.
    ///
    /// A missing, unreadable, or malformed snapshot yields the default
    /// state; the problem is logged, never returned. A snapshot beyond the
    /// configured plausibility limits is kept and logged. If the save was
    /// last played on an earlier date the task set is replaced with the
    /// default daily tasks.
    pub fn load(storage: S, clock: C, config: GameConfig) -> Self {
        let curve = LevelCurve::new(config.levels);
        let today = clock.today();
        let defaults = GameState::fresh(&config, today);
        // A save without a play date must still trigger the daily reset.
        let mut merge_base = defaults.clone();
        merge_base.last_play_date.clear();

        let state = match storage.load_game(&config.save_slot) {
            Ok(Some(snapshot)) => match GameState::from_snapshot(&snapshot, &merge_base) {
                Ok(mut loaded) => {
                    loaded.normalize(&curve);
                    if let Err(err) = check_integrity(&loaded, &config.integrity, &curve) {
                        log::warn!("saved state looks implausible: {err}");
                    }
                    if loaded.roll_daily_tasks(today) {
                        log::info!("new day, daily tasks reset");
                    }
                    loaded
                }
                Err(err) => {
                    log::warn!("failed to parse saved state: {err}");
                    defaults
                }
            },
            Ok(None) => defaults,
            Err(err) => {
                log::warn!("failed to read saved state: {err}");
                defaults
            }
        };

        Self {
            state,
            storage,
            clock,
            config,
            curve,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub const fn encounter(&self) -> Encounter {
        self.state.encounter()
    }

    #[must_use]
    pub fn task_views(&self) -> Vec<TaskView> {
        self.state.tasks.views()
    }

    /// Spend `amount` firecrackers on one action.
    ///
    /// Returns `false` without touching state when the balance is short.
    pub fn consume_currency(&mut self, amount: u64) -> bool {
        if self.state.currency < amount {
            return false;
        }
        self.state.currency -= amount;
        self.state.total_actions = self.state.total_actions.saturating_add(1);
        self.state.tasks.advance(TASK_CLICKS, 1);
        self.commit();
        true
    }

    /// Returns `true` when the beast's HP is at zero after the hit.
    pub fn apply_damage(&mut self, damage: u64) -> bool {
        self.state.boss_hp = self.state.boss_hp.saturating_sub(damage);
        self.commit();
        self.state.boss_hp == 0
    }

    /// Move to the next level with a fully healed beast.
    ///
    /// Only meaningful after [`Self::apply_damage`] reported a defeat; this is
    /// not checked.
    pub fn advance_level(&mut self) {
        self.state.level = self.state.level.saturating_add(1);
        self.state.boss_max_hp = self.curve.max_hp_for(self.state.level);
        self.state.boss_hp = self.state.boss_max_hp;
        log::debug!(
            "advanced to level {} ({} HP)",
            self.state.level,
            self.state.boss_max_hp
        );
        self.commit();
    }

    /// Credit firecrackers (task rewards, gifts).
    pub fn add_currency(&mut self, amount: u64) {
        self.state.currency = self.state.currency.saturating_add(amount);
        self.commit();
    }

    /// Unknown or completed tasks are ignored.
    pub fn progress_task(&mut self, task_id: &str, increment: u32) {
        if self.state.tasks.advance(task_id, increment) {
            self.commit();
        }
    }

    /// Raise a task's progress to an absolute `value`; used for elapsed-time
    /// tasks. Ignored if progress would not increase.
    pub fn set_task_progress_at_least(&mut self, task_id: &str, value: u32) {
        if self.state.tasks.raise_to(task_id, value) {
            self.commit();
        }
    }

    /// Complete a ready task and pay out its reward.
    pub fn claim_task(&mut self, task_id: &str) -> bool {
        self.try_claim_task(task_id).is_ok()
    }

    /// Like [`Self::claim_task`], reporting why a claim was refused.
    ///
    /// # Errors
    ///
    /// Returns the refusal reason; state is unchanged.
    pub fn try_claim_task(&mut self, task_id: &str) -> Result<u64, ClaimRefusal> {
        let reward = self.state.tasks.claim(task_id)?;
        self.state.currency = self.state.currency.saturating_add(reward);
        self.commit();
        Ok(reward)
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        if self.state.sound_enabled != enabled {
            self.state.sound_enabled = enabled;
            self.commit();
        }
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        if self.state.music_enabled != enabled {
            self.state.music_enabled = enabled;
            self.commit();
        }
    }

    /// Discard all progress and start over from defaults.
    pub fn reset(&mut self) {
        self.state = GameState::fresh(&self.config, self.clock.today());
        self.commit();
    }

    /// Register an observer. It runs after every successful mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameState) -> anyhow::Result<()> + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was already removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Write the full state to storage. Failures are logged and dropped;
    /// the next mutation retries with a fresh full snapshot.
    pub fn persist(&self) {
        let snapshot = match self.state.to_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::error!("failed to serialize state: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.save_game(&self.config.save_slot, &snapshot) {
            log::error!("failed to save state: {err}");
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (id, listener) in &mut self.listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(state))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::error!("state listener {} failed: {err:#}", id.0),
                Err(_) => log::error!("state listener {} panicked", id.0),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn clock() -> ManualClock {
        ManualClock::new(NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(), 0)
    }

    fn fresh_store() -> StateStore<MemoryStorage, ManualClock> {
        StateStore::load(MemoryStorage::new(), clock(), GameConfig::standard())
    }

    #[test]
    fn consume_rejects_when_short() {
        let mut store = fresh_store();
        store.state.currency = 5;
        assert!(!store.consume_currency(10));
        assert_eq!(store.state().currency, 5);
        assert_eq!(store.state().total_actions, 0);
    }

    #[test]
    fn consume_updates_clicks_task_and_persists() {
        let mut store = fresh_store();
        assert!(store.consume_currency(1));
        assert_eq!(store.state().currency, 4_999);
        assert_eq!(store.state().total_actions, 1);
        assert_eq!(store.state().tasks.get("click_100").unwrap().progress, 1);
        let saved = store.storage().get("year-beast-game").unwrap();
        assert!(saved.contains(r#""firecrackers":4999"#));
    }

    #[test]
    fn defeat_then_advance() {
        let mut store = fresh_store();
        assert!(!store.apply_damage(400));
        assert_eq!(store.state().boss_hp, 600);
        assert!(store.apply_damage(1_000));
        assert_eq!(store.state().boss_hp, 0);
        assert_eq!(store.encounter(), Encounter::Defeated);
        assert!(store.apply_damage(10));
        store.advance_level();
        assert_eq!(store.state().level, 2);
        assert_eq!(store.state().boss_max_hp, 1_500);
        assert_eq!(store.state().boss_hp, 1_500);
    }

    #[test]
    fn listeners_see_each_mutation_until_unsubscribed() {
        let mut store = fresh_store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |state| {
            sink.borrow_mut().push(state.currency);
            Ok(())
        });
        store.consume_currency(1);
        store.add_currency(10);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.consume_currency(1);
        assert_eq!(*seen.borrow(), vec![4_999, 5_009]);
    }

    #[test]
    fn no_op_actions_do_not_notify() {
        let mut store = fresh_store();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        store.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });
        store.progress_task("unknown", 1);
        assert!(!store.claim_task("click_100"));
        store.set_sound_enabled(true);
        assert!(!store.consume_currency(u64::MAX));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut store = fresh_store();
        store.apply_damage(1_000);
        store.advance_level();
        store.consume_currency(100);
        store.reset();
        let expected = GameState::fresh(&GameConfig::standard(), store.clock().today());
        assert_eq!(store.state(), &expected);
    }
}
