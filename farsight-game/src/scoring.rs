//! Pure scoring rules for numeric and choice stages.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ScoringConfig;
use crate::constants::CHOICE_FULL_SCORE;
use crate::numbers::round_to_score;
use crate::stage::{Choice, ChoiceTruth, DistanceTruth};

/// Result quality label shown with the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultTier {
    GodsEye,
    MastersEye,
    HawksEye,
    GoodEye,
    AverageEye,
    BlindSpot,
    SawThrough,
    Fooled,
}

impl ResultTier {
    /// Accuracy tiers for numeric stages, best first.
    pub const ACCURACY: [Self; 6] = [
        Self::GodsEye,
        Self::MastersEye,
        Self::HawksEye,
        Self::GoodEye,
        Self::AverageEye,
        Self::BlindSpot,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GodsEye => "God's Eye",
            Self::MastersEye => "Master's Eye",
            Self::HawksEye => "Hawk's Eye",
            Self::GoodEye => "Good Eye",
            Self::AverageEye => "Average Eye",
            Self::BlindSpot => "Blind Spot",
            Self::SawThrough => "Saw Through It",
            Self::Fooled => "Fooled",
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::GodsEye => "🏆",
            Self::MastersEye => "👁️",
            Self::HawksEye => "🎯",
            Self::GoodEye => "👀",
            Self::AverageEye => "👁️‍🗨️",
            Self::BlindSpot => "🙈",
            Self::SawThrough => "✅",
            Self::Fooled => "❌",
        }
    }
}

impl fmt::Display for ResultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceOutcome {
    pub guessed_distance_m: f64,
    pub correct_distance_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guessed_height_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_height_m: Option<f64>,
    pub distance_error_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_error_pct: Option<f64>,
    pub combined_error_pct: f64,
    /// True when the height was substituted from a previously revealed subject.
    #[serde(default)]
    pub height_known: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOutcome {
    pub selected: Choice,
    pub correct_choice: Choice,
    pub correct: bool,
    pub magnitude_a: f64,
    pub magnitude_b: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultDetail {
    Distance(DistanceOutcome),
    Choice(ChoiceOutcome),
}

/// Scored outcome of one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_id: String,
    pub score: u8,
    pub tier: ResultTier,
    pub detail: ResultDetail,
}

impl StageResult {
    /// Error figure reported to the leaderboard: the combined percentage for
    /// numeric stages, 0 or 100 for choice stages.
    #[must_use]
    pub fn reported_error(&self) -> f64 {
        match &self.detail {
            ResultDetail::Distance(outcome) => outcome.combined_error_pct,
            ResultDetail::Choice(outcome) => {
                if outcome.correct {
                    0.0
                } else {
                    100.0
                }
            }
        }
    }
}

/// Relative error in percent.
#[must_use]
pub fn relative_error_pct(guess: f64, truth: f64) -> f64 {
    (guess - truth).abs() / truth * 100.0
}

#[must_use]
pub fn score_from_error(config: &ScoringConfig, combined_error_pct: f64) -> u8 {
    round_to_score(100.0 - combined_error_pct * config.damping_factor)
}

#[must_use]
pub fn tier_for_error(config: &ScoringConfig, combined_error_pct: f64) -> ResultTier {
    config
        .tier_thresholds
        .iter()
        .position(|&threshold| combined_error_pct <= threshold)
        .map_or(ResultTier::BlindSpot, |index| ResultTier::ACCURACY[index])
}

/// Score a numeric-distance submission.
///
/// When `height_known` is set the correct height stands in for the guess, so
/// the height dimension scores as perfect.
#[must_use]
pub fn score_distance(
    config: &ScoringConfig,
    stage_id: &str,
    truth: &DistanceTruth,
    guessed_distance_m: f64,
    guessed_height_m: f64,
    height_known: bool,
) -> StageResult {
    let distance_error_pct = relative_error_pct(guessed_distance_m, truth.correct_distance_m);
    let effective_height = truth.correct_height_m.map(|correct| {
        if height_known {
            correct
        } else {
            guessed_height_m
        }
    });
    let height_error_pct = truth
        .correct_height_m
        .zip(effective_height)
        .map(|(correct, guess)| relative_error_pct(guess, correct));
    let combined_error_pct =
        height_error_pct.map_or(distance_error_pct, |height| (distance_error_pct + height) / 2.0);

    StageResult {
        stage_id: stage_id.to_string(),
        score: score_from_error(config, combined_error_pct),
        tier: tier_for_error(config, combined_error_pct),
        detail: ResultDetail::Distance(DistanceOutcome {
            guessed_distance_m,
            correct_distance_m: truth.correct_distance_m,
            guessed_height_m: effective_height,
            correct_height_m: truth.correct_height_m,
            distance_error_pct,
            height_error_pct,
            combined_error_pct,
            height_known: height_known && truth.correct_height_m.is_some(),
        }),
    }
}

/// Score a choice submission: all or nothing.
#[must_use]
pub fn score_choice(stage_id: &str, truth: &ChoiceTruth, selected: Choice) -> StageResult {
    let correct = selected == truth.correct_choice;
    StageResult {
        stage_id: stage_id.to_string(),
        score: if correct { CHOICE_FULL_SCORE } else { 0 },
        tier: if correct {
            ResultTier::SawThrough
        } else {
            ResultTier::Fooled
        },
        detail: ResultDetail::Choice(ChoiceOutcome {
            selected,
            correct_choice: truth.correct_choice,
            correct,
            magnitude_a: truth.magnitude_a,
            magnitude_b: truth.magnitude_b,
        }),
    }
}
