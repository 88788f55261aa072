use anyhow::{Context, Result};
use omikuji_game::{DrawPhase, DrawSequence, FortuneCatalog};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// Observed versus expected share for one fortune level.
#[derive(Debug, Clone, Serialize)]
pub struct LevelShare {
    pub level_id: String,
    pub japanese: String,
    pub count: u32,
    pub observed: f64,
    pub expected: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawSummary {
    pub seed: u64,
    pub draws: u32,
    pub shares: Vec<LevelShare>,
    pub failures: Vec<String>,
}

impl DrawSummary {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walk `draws` complete omikuji sequences and tally the revealed levels.
///
/// # Errors
///
/// Returns an error if the sequence refuses a step of the normal walk.
pub fn run_draws(
    catalog: &FortuneCatalog,
    seed: u64,
    draws: u32,
    tolerance: f64,
) -> Result<DrawSummary> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut counts = vec![0_u32; catalog.levels.len()];
    let mut failures = Vec::new();
    let mut sequence = DrawSequence::new(catalog);

    for draw in 0..draws {
        sequence.reset();
        sequence
            .auto_shake(&mut rng, u64::from(draw))
            .with_context(|| format!("draw {draw}: shaking"))?;
        sequence
            .emerge_complete()
            .and_then(|_| sequence.unfold())
            .and_then(|_| sequence.unfold_complete())
            .with_context(|| format!("draw {draw}: unfolding"))?;
        debug_assert_eq!(sequence.phase(), DrawPhase::ShowingFortune);

        let Some(fortune) = sequence.revealed() else {
            failures.push(format!("draw {draw} revealed nothing"));
            continue;
        };
        if let Some(index) = catalog
            .levels
            .iter()
            .position(|level| level.id == fortune.level_id)
        {
            counts[index] += 1;
        } else {
            failures.push(format!("draw {draw} produced unknown level {}", fortune.level_id));
        }
        if let Some((category, _)) = fortune.categories.iter().find(|(_, text)| text.is_empty()) {
            failures.push(format!(
                "draw {draw} ({}) has no {category} message",
                fortune.level_id
            ));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let total_weight = catalog.total_weight().max(1) as f64;
    let shares: Vec<LevelShare> = catalog
        .levels
        .iter()
        .zip(counts)
        .map(|(level, count)| LevelShare {
            level_id: level.id.clone(),
            japanese: level.japanese.clone(),
            count,
            observed: f64::from(count) / f64::from(draws.max(1)),
            expected: f64::from(level.weight) / total_weight,
        })
        .collect();

    for share in &shares {
        if draws > 0 && (share.observed - share.expected).abs() > tolerance {
            failures.push(format!(
                "{} drawn {:.3}, expected {:.3}",
                share.level_id, share.observed, share.expected
            ));
        }
    }

    Ok(DrawSummary {
        seed,
        draws,
        shares,
        failures,
    })
}
