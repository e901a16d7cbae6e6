//! Difficulty tiers and the ordinal → tightness band policy shared by both
//! procedural catalogs.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    GAP_FRACTION_BANDS, ILLUSION_DIFF_PCT_BANDS, ILLUSION_SAME_PROBABILITY,
    ILLUSION_STRENGTH_BANDS,
};
use crate::numbers::usize_to_f64;

/// Number of contiguous tiers the ordinal range is partitioned into.
pub const TIER_COUNT: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Normal, Self::Hard, Self::Expert];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
            Self::Expert => 3,
        }
    }

    const fn from_index(index: u32) -> Self {
        match index {
            0 => Self::Easy,
            1 => Self::Normal,
            2 => Self::Hard,
            _ => Self::Expert,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            "expert" => Ok(Self::Expert),
            _ => Err(()),
        }
    }
}

/// Where an ordinal lands within the tier partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPlacement {
    pub tier: Difficulty,
    /// Position inside the tier, 0.0 at its first ordinal and 1.0 at its last.
    pub progress: f64,
}

/// Place a 1-based `ordinal` within a catalog of `total` stages.
///
/// Out-of-range ordinals are clamped into `1..=total`; an empty catalog places
/// everything at the start of the easy tier.
#[must_use]
pub fn place(ordinal: u32, total: u32) -> BandPlacement {
    if total == 0 {
        return BandPlacement {
            tier: Difficulty::Easy,
            progress: 0.0,
        };
    }
    let n = ordinal.clamp(1, total);
    let zero_based = u64::from(n - 1);
    let total_wide = u64::from(total);
    let tier_index = (zero_based * u64::from(TIER_COUNT) / total_wide) as u32;

    // First zero-based ordinal of tier t is ceil(t * total / TIER_COUNT).
    let start = tier_start(tier_index, total_wide);
    let end = tier_start(tier_index + 1, total_wide);
    let span = end.saturating_sub(start);
    let progress = if span <= 1 {
        0.0
    } else {
        usize_to_f64((zero_based - start) as usize) / usize_to_f64((span - 1) as usize)
    };

    BandPlacement {
        tier: Difficulty::from_index(tier_index),
        progress: progress.clamp(0.0, 1.0),
    }
}

fn tier_start(tier_index: u32, total: u64) -> u64 {
    let tiers = u64::from(TIER_COUNT);
    (u64::from(tier_index) * total).div_ceil(tiers)
}

/// Tier for an ordinal; non-decreasing as the ordinal grows.
#[must_use]
pub fn tier_for(ordinal: u32, total: u32) -> Difficulty {
    place(ordinal, total).tier
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Distance-gap fraction for a paired-comparison stage.
///
/// Interpolates from the top of the tier interval toward its bottom, so the
/// gap never widens as the ordinal grows.
#[must_use]
pub fn gap_fraction(ordinal: u32, total: u32) -> f64 {
    let placement = place(ordinal, total);
    let (min, max) = GAP_FRACTION_BANDS[placement.tier.index()];
    lerp(max, min, placement.progress)
}

/// Renderer-facing illusion strength in `[0, 1]` for a size-illusion stage.
#[must_use]
pub fn illusion_strength(ordinal: u32, total: u32) -> f64 {
    let placement = place(ordinal, total);
    let (min, max) = ILLUSION_STRENGTH_BANDS[placement.tier.index()];
    lerp(min, max, placement.progress).clamp(0.0, 1.0)
}

/// Interval the gap fraction is drawn from for a tier.
#[must_use]
pub const fn gap_band(tier: Difficulty) -> (f64, f64) {
    GAP_FRACTION_BANDS[tier.index()]
}

/// Difference-percentage band (as fractions) for unequal illusion stages.
#[must_use]
pub const fn illusion_difference_band(tier: Difficulty) -> (f64, f64) {
    ILLUSION_DIFF_PCT_BANDS[tier.index()]
}

/// Probability that an illusion stage at this tier has equal magnitudes.
#[must_use]
pub const fn illusion_same_probability(tier: Difficulty) -> f64 {
    ILLUSION_SAME_PROBABILITY[tier.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_stage_partition_is_contiguous() {
        let tiers: Vec<Difficulty> = (1..=50).map(|n| tier_for(n, 50)).collect();
        assert_eq!(tiers[0], Difficulty::Easy);
        assert_eq!(tiers[12], Difficulty::Easy);
        assert_eq!(tiers[13], Difficulty::Normal);
        assert_eq!(tiers[24], Difficulty::Normal);
        assert_eq!(tiers[25], Difficulty::Hard);
        assert_eq!(tiers[37], Difficulty::Hard);
        assert_eq!(tiers[38], Difficulty::Expert);
        assert_eq!(tiers[49], Difficulty::Expert);
        assert!(tiers.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn progress_spans_each_tier() {
        let first = place(1, 50);
        assert!(first.progress.abs() < f64::EPSILON);
        let last_easy = place(13, 50);
        assert!((last_easy.progress - 1.0).abs() < f64::EPSILON);
        let first_normal = place(14, 50);
        assert_eq!(first_normal.tier, Difficulty::Normal);
        assert!(first_normal.progress.abs() < f64::EPSILON);
    }

    #[test]
    fn ordinals_are_clamped() {
        assert_eq!(place(0, 50), place(1, 50));
        assert_eq!(place(99, 50), place(50, 50));
        assert_eq!(place(3, 0).tier, Difficulty::Easy);
        assert_eq!(tier_for(1, 1), Difficulty::Easy);
        assert_eq!(tier_for(2, 2), Difficulty::Hard);
    }

    #[test]
    fn tightness_moves_monotonically() {
        for total in [4_u32, 7, 50, 101] {
            for n in 1..total {
                assert!(
                    gap_fraction(n + 1, total) <= gap_fraction(n, total) + 1e-12,
                    "gap widened at {n}/{total}"
                );
                assert!(
                    illusion_strength(n + 1, total) + 1e-12 >= illusion_strength(n, total),
                    "strength weakened at {n}/{total}"
                );
            }
        }
    }

    #[test]
    fn hardest_gap_is_a_few_percent() {
        let (lo, hi) = gap_band(Difficulty::Expert);
        let last = gap_fraction(50, 50);
        assert!(last >= lo && last <= hi);
        assert!(last < gap_band(Difficulty::Easy).1);
        assert!((illusion_strength(50, 50) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn difficulty_round_trips_through_str() {
        for tier in Difficulty::ALL {
            assert_eq!(tier.as_str().parse::<Difficulty>(), Ok(tier));
        }
        assert!("legendary".parse::<Difficulty>().is_err());
    }
}
