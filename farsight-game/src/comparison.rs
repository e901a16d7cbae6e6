//! Procedural paired depth-comparison stages.
use log::debug;

use crate::constants::{
    COMPARISON_BASE_MAX_M, COMPARISON_BASE_MIN_M, COMPARISON_DOMAIN_TAG, COMPARISON_FLOOR_M,
    COMPARISON_MIN_OFFSET_M,
};
use crate::difficulty::{gap_fraction, tier_for};
use crate::rng::{ParkMillerStream, SequenceGenerator, derive_stage_seed};
use crate::stage::{
    Category, Choice, ChoicePayload, ChoiceTruth, ComparisonScene, SceneTrick, Stage, StageAnswer,
};

pub const COMPARISON_QUESTION: &str = "Which target is closer?";

/// Stage id for a 1-based ordinal (`compare-01`, `compare-02`, ...).
#[must_use]
pub fn comparison_id(ordinal: u32) -> String {
    format!("compare-{ordinal:02}")
}

/// Trick family for an ordinal, cycled round-robin.
#[must_use]
pub fn trick_for(ordinal: u32) -> SceneTrick {
    let index = (ordinal.max(1) - 1) as usize % SceneTrick::ALL.len();
    SceneTrick::ALL[index]
}

/// Build `count` comparison stages from `seed`.
#[must_use]
pub fn generate(seed: u64, count: u32) -> Vec<Stage> {
    let stages: Vec<Stage> = (1..=count)
        .map(|ordinal| generate_stage(seed, ordinal, count))
        .collect();
    debug!("generated {} comparison stages from seed {seed:#x}", stages.len());
    stages
}

/// Build a single comparison stage; content depends only on the arguments.
#[must_use]
pub fn generate_stage(seed: u64, ordinal: u32, total: u32) -> Stage {
    let mut stream = ParkMillerStream::new(derive_stage_seed(COMPARISON_DOMAIN_TAG, seed, ordinal));
    let trick = trick_for(ordinal);

    let distance_a = stream
        .range(COMPARISON_BASE_MIN_M, COMPARISON_BASE_MAX_M)
        .round();
    let gap = gap_fraction(ordinal, total);
    let farther = stream.coin();
    let offset = (distance_a * gap).round().max(COMPARISON_MIN_OFFSET_M);
    let raw_b = if farther {
        distance_a + offset
    } else {
        distance_a - offset
    };
    let mut distance_b = raw_b.max(COMPARISON_FLOOR_M);
    if (distance_b - distance_a).abs() < f64::EPSILON {
        distance_b = distance_a + COMPARISON_MIN_OFFSET_M;
    }

    // Ties resolve to A, though generation never yields one.
    let correct_choice = if distance_a <= distance_b {
        Choice::A
    } else {
        Choice::B
    };

    let scene = ComparisonScene {
        trick_a: trick,
        trick_b: trick,
        normalization_reference: (distance_a * distance_b).sqrt(),
        seed_a: stream.next_seed(),
        seed_b: stream.next_seed(),
    };

    Stage {
        id: comparison_id(ordinal),
        name: format!("Depth Comparison #{ordinal}"),
        category: Category::Comparison,
        difficulty: tier_for(ordinal, total),
        answer: StageAnswer::Choice(ChoiceTruth {
            question: COMPARISON_QUESTION.to_string(),
            correct_choice,
            magnitude_a: distance_a,
            magnitude_b: distance_b,
            payload: ChoicePayload::Comparison(scene),
        }),
    }
}
