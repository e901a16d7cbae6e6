use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::HashSet;

/// Catalog seed requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedInfo {
    pub seed: u64,
    /// Drawn from the OS generator because the token was `random`.
    pub random: bool,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            random: false,
        }
    }

    #[must_use]
    pub fn draw() -> Self {
        Self {
            seed: rand::random::<u64>(),
            random: true,
        }
    }

    /// Illusion catalog seed paired with this comparison seed.
    #[must_use]
    pub const fn illusion_seed(self) -> u64 {
        self.seed.rotate_left(17) ^ 0x0F0F_F0F0_A5A5_5A5A
    }
}

/// Resolve CLI seed tokens into seeds.
///
/// Accepts signed or unsigned integers and the keyword `random`; duplicates are
/// dropped and an empty list falls back to 1337.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut seeds: Vec<SeedInfo> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let info = if token.eq_ignore_ascii_case("random") {
            SeedInfo::draw()
        } else if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if seen.insert(info.seed) {
            seeds.push(info);
        }
    }

    if seeds.is_empty() {
        seeds.push(SeedInfo::from_numeric(1337));
    }

    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numeric_tokens_and_dedupes() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "42", ""])).unwrap();
        assert_eq!(
            seeds,
            vec![SeedInfo::from_numeric(42), SeedInfo::from_numeric(7)]
        );
    }

    #[test]
    fn random_token_draws_a_seed() {
        let seeds = resolve_seed_inputs(&tokens(&["RANDOM"])).unwrap();
        assert_eq!(seeds.len(), 1);
        assert!(seeds[0].random);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        let seeds = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(1337)]);
    }

    #[test]
    fn rejects_garbage() {
        let err = resolve_seed_inputs(&tokens(&["CL-ORANGE42"])).unwrap_err();
        assert!(err.to_string().contains("CL-ORANGE42"));
    }

    #[test]
    fn illusion_seed_differs_from_comparison_seed() {
        let info = SeedInfo::from_numeric(1337);
        assert_ne!(info.illusion_seed(), info.seed);
    }
}
