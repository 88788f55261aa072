//! Plausibility checks and checksums for saved state.
use std::hash::Hasher;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::config::IntegrityLimits;
use crate::levels::LevelCurve;
use crate::state::GameState;

const CHECKSUM_SEED: u64 = 0x5945_4152_4245_4153;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("firecracker count {value} exceeds {max}")]
    Currency { value: u64, max: u64 },
    #[error("level {value} outside 1..={max}")]
    Level { value: u32, max: u32 },
    #[error("beast HP {hp} exceeds max {max_hp}")]
    BossHp { hp: u64, max_hp: u64 },
    #[error("beast max HP {found} does not match level curve ({expected})")]
    BossMaxHp { found: u64, expected: u64 },
    #[error("task {id} progress {progress} outside 0..={target}")]
    TaskProgress {
        id: String,
        progress: u32,
        target: u32,
    },
}

/// Reject values no legitimate play session can reach.
///
/// # Errors
///
/// Returns the first implausible field found.
pub fn check_integrity(
    state: &GameState,
    limits: &IntegrityLimits,
    curve: &LevelCurve,
) -> Result<(), IntegrityError> {
    if state.currency > limits.max_currency {
        return Err(IntegrityError::Currency {
            value: state.currency,
            max: limits.max_currency,
        });
    }
    if state.level < 1 || state.level > limits.max_level {
        return Err(IntegrityError::Level {
            value: state.level,
            max: limits.max_level,
        });
    }
    let expected = curve.max_hp_for(state.level);
    if state.boss_max_hp != expected {
        return Err(IntegrityError::BossMaxHp {
            found: state.boss_max_hp,
            expected,
        });
    }
    if state.boss_hp > state.boss_max_hp {
        return Err(IntegrityError::BossHp {
            hp: state.boss_hp,
            max_hp: state.boss_max_hp,
        });
    }
    if let Some(task) = state
        .tasks
        .iter()
        .find(|t| t.progress > t.target || (t.completed && t.progress < t.target))
    {
        return Err(IntegrityError::TaskProgress {
            id: task.id.clone(),
            progress: task.progress,
            target: task.target,
        });
    }
    Ok(())
}

/// Base-36 xxHash64 of the state's JSON snapshot.
#[must_use]
pub fn snapshot_checksum(state: &GameState) -> String {
    let bytes = serde_json::to_vec(state).unwrap_or_default();
    let mut hasher = XxHash64::with_seed(CHECKSUM_SEED);
    hasher.write(&bytes);
    to_base36(hasher.finish())
}

#[must_use]
pub fn verify_checksum(state: &GameState, checksum: &str) -> bool {
    snapshot_checksum(state).eq_ignore_ascii_case(checksum)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return String::from("0");
    }
    let mut out = Vec::with_capacity(13);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use chrono::NaiveDate;

    fn state() -> GameState {
        GameState::fresh(
            &GameConfig::standard(),
            NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(),
        )
    }

    #[test]
    fn fresh_state_passes() {
        let curve = LevelCurve::default();
        assert_eq!(
            check_integrity(&state(), &IntegrityLimits::default(), &curve),
            Ok(())
        );
    }

    #[test]
    fn flags_impossible_values() {
        let curve = LevelCurve::default();
        let limits = IntegrityLimits::default();

        let mut rich = state();
        rich.currency = 1_000_000;
        assert!(matches!(
            check_integrity(&rich, &limits, &curve),
            Err(IntegrityError::Currency { .. })
        ));

        let mut deep = state();
        deep.level = 101;
        assert!(matches!(
            check_integrity(&deep, &limits, &curve),
            Err(IntegrityError::Level { value: 101, .. })
        ));

        let mut mismatched = state();
        mismatched.boss_max_hp = 5;
        mismatched.boss_hp = 5;
        assert!(matches!(
            check_integrity(&mismatched, &limits, &curve),
            Err(IntegrityError::BossMaxHp { .. })
        ));
    }

    #[test]
    fn checksum_tracks_content() {
        let original = state();
        let sum = snapshot_checksum(&original);
        assert!(verify_checksum(&original, &sum));
        assert!(verify_checksum(&original, &sum.to_uppercase()));

        let mut changed = original;
        changed.currency += 1;
        assert!(!verify_checksum(&changed, &sum));
    }

    #[test]
    fn base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
