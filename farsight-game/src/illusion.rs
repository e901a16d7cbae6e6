//! Procedural size-illusion quiz stages.
//!
//! The figure always works against the player: on unequal stages the illusion
//! favors the smaller side, and on equal stages it favors an arbitrary side.
use log::debug;

use crate::constants::{
    ILLUSION_BASE_MAX, ILLUSION_BASE_MIN, ILLUSION_DOMAIN_TAG, ILLUSION_FLOOR, ILLUSION_MIN_OFFSET,
};
use crate::difficulty::{
    illusion_difference_band, illusion_same_probability, illusion_strength, tier_for,
};
use crate::rng::{SequenceGenerator, XorShiftStream, derive_stage_seed};
use crate::stage::{
    Category, Choice, ChoicePayload, ChoiceTruth, IllusionFamily, IllusionFigure, Side, Stage,
    StageAnswer,
};

pub const ILLUSION_QUESTION: &str = "Which one is larger?";

#[must_use]
pub fn illusion_id(ordinal: u32) -> String {
    format!("illusion-{ordinal:02}")
}

/// Figure family for an ordinal, cycled round-robin.
#[must_use]
pub fn family_for(ordinal: u32) -> IllusionFamily {
    let index = (ordinal.max(1) - 1) as usize % IllusionFamily::ALL.len();
    IllusionFamily::ALL[index]
}

#[must_use]
pub fn generate(seed: u64, count: u32) -> Vec<Stage> {
    let stages: Vec<Stage> = (1..=count)
        .map(|ordinal| generate_stage(seed, ordinal, count))
        .collect();
    debug!("generated {} illusion stages from seed {seed:#x}", stages.len());
    stages
}

#[must_use]
pub fn generate_stage(seed: u64, ordinal: u32, total: u32) -> Stage {
    let mut stream = XorShiftStream::new(derive_stage_seed(ILLUSION_DOMAIN_TAG, seed, ordinal));
    let family = family_for(ordinal);
    let tier = tier_for(ordinal, total);

    let same = stream.chance(illusion_same_probability(tier));
    let base = stream.range(ILLUSION_BASE_MIN, ILLUSION_BASE_MAX).round();

    let (size_a, size_b, correct_choice, favors) = if same {
        (base, base, Choice::Same, Side::pick(stream.coin()))
    } else {
        let (lo, hi) = illusion_difference_band(tier);
        let pct = stream.range(lo, hi);
        let offset = (base * pct).round().max(ILLUSION_MIN_OFFSET);
        let smaller = (base - offset).max(ILLUSION_FLOOR);
        let larger_side = Side::pick(stream.coin());
        let (a, b) = match larger_side {
            Side::A => (base, smaller),
            Side::B => (smaller, base),
        };
        (a, b, larger_side.as_choice(), larger_side.other())
    };

    let figure = IllusionFigure {
        family,
        illusion_strength: illusion_strength(ordinal, total),
        illusion_favors: favors,
        seed: stream.next_seed(),
        explanation: family.explanation().to_string(),
    };

    Stage {
        id: illusion_id(ordinal),
        name: format!("{} #{ordinal}", family.label()),
        category: Category::Illusion,
        difficulty: tier,
        answer: StageAnswer::Choice(ChoiceTruth {
            question: ILLUSION_QUESTION.to_string(),
            correct_choice,
            magnitude_a: size_a,
            magnitude_b: size_b,
            payload: ChoicePayload::Illusion(figure),
        }),
    }
}
