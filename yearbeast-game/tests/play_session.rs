use chrono::NaiveDate;
use yearbeast_game::{
    Clock, CombatConfig, GameConfig, HitResult, LevelCurve, ManualClock, MemoryStorage, Session,
    critical_damage,
};

fn start(seed: u64, config: GameConfig) -> (Session<MemoryStorage, ManualClock>, ManualClock) {
    let clock = ManualClock::new(NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(), 0);
    let session = Session::start(MemoryStorage::new(), clock.clone(), config, seed);
    (session, clock)
}

/// Tap at a human pace (5 taps/s) until `levels` beasts are cleared or the
/// firecrackers run out.
fn play(session: &mut Session<MemoryStorage, ManualClock>, clock: &ManualClock, levels: u32) {
    let mut cleared = 0;
    while cleared < levels {
        clock.advance_millis(200);
        let now = clock.now_millis();
        session.tick(now);
        match session.hit(now) {
            HitResult::Hit { defeated: true, .. } => {
                session.finish_encounter();
                cleared += 1;
            }
            HitResult::Hit { .. } => {}
            HitResult::OutOfCurrency => break,
            HitResult::RateLimited => panic!("human pace should never be throttled"),
        }
    }
}

#[test]
fn seeded_sessions_are_reproducible() {
    let (mut a, clock_a) = start(0x2026, GameConfig::standard());
    let (mut b, clock_b) = start(0x2026, GameConfig::standard());
    play(&mut a, &clock_a, 3);
    play(&mut b, &clock_b, 3);
    assert_eq!(a.store().state(), b.store().state());
    assert_eq!(a.store().state().level, 4);
}

#[test]
fn clearing_levels_costs_between_crit_and_normal_bounds() {
    let (mut session, clock) = start(7, GameConfig::standard());
    play(&mut session, &clock, 2);
    let state = session.store().state();
    let curve = LevelCurve::default();
    let hp: u64 = (1..=2).map(|level| curve.max_hp_for(level)).sum();
    let combat = CombatConfig::default();
    let most = hp.div_ceil(combat.base_damage);
    let fewest = hp.div_ceil(critical_damage(&combat));
    assert!(
        (fewest..=most).contains(&state.total_actions),
        "spent {} taps",
        state.total_actions
    );
    assert_eq!(state.currency, 5_000 - state.total_actions);
}

#[test]
fn long_session_completes_every_daily_task() {
    let (mut session, clock) = start(11, GameConfig::standard());
    play(&mut session, &clock, 2);
    for id in ["daily_login", "stay_15s", "click_100"] {
        assert!(session.claim(id), "{id} should be claimable");
    }
    let state = session.store().state();
    assert!(state.tasks.iter().all(|t| t.completed));
    assert_eq!(state.currency, 5_000 - state.total_actions + 50 + 30 + 100);
    assert!(!session.stay_timer().is_active());
}

#[test]
fn running_dry_stops_the_fight() {
    let config = GameConfig {
        starting_currency: 20,
        ..GameConfig::standard()
    };
    let (mut session, clock) = start(3, config);
    play(&mut session, &clock, 1);
    let state = session.store().state();
    assert_eq!(state.currency, 0);
    assert_eq!(state.total_actions, 20);
    assert_eq!(state.level, 1);
    assert!(state.boss_hp > 0);
}
