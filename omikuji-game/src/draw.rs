//! Weighted fortune draws.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{Category, FortuneCatalog, FortuneLevel};

/// A drawn fortune with one message per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortune {
    pub level_id: String,
    pub japanese: String,
    pub english: String,
    pub categories: BTreeMap<Category, String>,
    pub drawn_at_millis: u64,
}

/// Pick a level with probability proportional to its weight.
///
/// Returns `None` only for an empty catalog.
pub fn draw_level<'c, R>(catalog: &'c FortuneCatalog, rng: &mut R) -> Option<&'c FortuneLevel>
where
    R: Rng + ?Sized,
{
    let total = catalog.total_weight();
    if total == 0 {
        return catalog.fallback_level();
    }
    #[allow(clippy::cast_precision_loss)]
    let mut roll = rng.r#gen::<f64>() * total as f64;
    for level in &catalog.levels {
        roll -= f64::from(level.weight);
        if roll <= 0.0 {
            return Some(level);
        }
    }
    catalog.fallback_level()
}

/// Draw a level and gather its message for every category.
pub fn generate_fortune<R>(
    catalog: &FortuneCatalog,
    rng: &mut R,
    drawn_at_millis: u64,
) -> Option<Fortune>
where
    R: Rng + ?Sized,
{
    let level = draw_level(catalog, rng)?;
    let categories = Category::ALL
        .into_iter()
        .map(|category| {
            let text = catalog.message(category, &level.id).unwrap_or_default();
            (category, text.to_string())
        })
        .collect();
    Some(Fortune {
        level_id: level.id.clone(),
        japanese: level.japanese.clone(),
        english: level.english.clone(),
        categories,
        drawn_at_millis,
    })
}
