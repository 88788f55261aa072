//! Hit resolution for a single firecracker.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitOutcome {
    pub damage: u64,
    pub is_critical: bool,
}

/// Roll one hit. Consumes exactly one `f64` sample from `rng`.
///
/// A sample below `critical_chance` is a critical hit dealing
/// `floor(base_damage * critical_multiplier)`; otherwise the hit deals
/// `base_damage`.
pub fn resolve_hit<R>(cfg: &CombatConfig, rng: &mut R) -> HitOutcome
where
    R: Rng + ?Sized,
{
    let roll: f64 = rng.r#gen();
    if roll < cfg.critical_chance {
        HitOutcome {
            damage: critical_damage(cfg),
            is_critical: true,
        }
    } else {
        HitOutcome {
            damage: cfg.base_damage,
            is_critical: false,
        }
    }
}

#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn critical_damage(cfg: &CombatConfig) -> u64 {
    (cfg.base_damage as f64 * cfg.critical_multiplier).floor() as u64
}
