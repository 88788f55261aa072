use anyhow::{Context, Result};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse comma-separated seeds. Negative values are folded to their
/// magnitude so `-7` and `7` replay the same session.
pub fn parse_seeds(s: &str) -> Result<Vec<u64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .or_else(|_| token.parse::<i64>().map(i64::unsigned_abs))
                .with_context(|| format!("invalid seed {token:?}"))
        })
        .collect()
}
