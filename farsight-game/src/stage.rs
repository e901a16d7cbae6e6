//! Stage data model: the immutable unit of play and its answer truths.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::difficulty::Difficulty;

/// Closed set of stage categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Landmark,
    Skytree,
    Comparison,
    Illusion,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Landmark, Self::Skytree, Self::Comparison, Self::Illusion];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landmark => "landmark",
            Self::Skytree => "skytree",
            Self::Comparison => "comparison",
            Self::Illusion => "illusion",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Landmark => "Landmarks",
            Self::Skytree => "Skytree Viewpoints",
            Self::Comparison => "Depth Comparison",
            Self::Illusion => "Optical Illusions",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Landmark => "🏛️",
            Self::Skytree => "🗼",
            Self::Comparison => "🔭",
            Self::Illusion => "🌀",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Landmark => "Guess the distance to famous structures around the world",
            Self::Skytree => "Guess how far Tokyo Skytree is from each viewpoint",
            Self::Comparison => "Pick the closer of two targets despite misleading depth cues",
            Self::Illusion => "Pick the larger figure while a classic illusion works against you",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "landmark" => Ok(Self::Landmark),
            "skytree" => Ok(Self::Skytree),
            "comparison" => Ok(Self::Comparison),
            "illusion" => Ok(Self::Illusion),
            _ => Err(()),
        }
    }
}

/// One of the two presented stimuli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    #[must_use]
    pub const fn as_choice(self) -> Choice {
        match self {
            Self::A => Choice::A,
            Self::B => Choice::B,
        }
    }

    /// Map a fair coin flip to a side.
    #[must_use]
    pub const fn pick(heads: bool) -> Self {
        if heads { Self::A } else { Self::B }
    }
}

/// Answer to a choice stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B")]
    B,
    Same,
}

impl Choice {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Same => "same",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "same" => Ok(Self::Same),
            _ => Err(()),
        }
    }
}

/// Depth-cue family drawn by the comparison scene renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneTrick {
    Perspective,
    Atmospheric,
    Texture,
    Occlusion,
    Size,
    Shadow,
    Vertical,
}

impl SceneTrick {
    pub const ALL: [Self; 7] = [
        Self::Perspective,
        Self::Atmospheric,
        Self::Texture,
        Self::Occlusion,
        Self::Size,
        Self::Shadow,
        Self::Vertical,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::Atmospheric => "atmospheric",
            Self::Texture => "texture",
            Self::Occlusion => "occlusion",
            Self::Size => "size",
            Self::Shadow => "shadow",
            Self::Vertical => "vertical",
        }
    }
}

impl fmt::Display for SceneTrick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classic size-illusion figure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IllusionFamily {
    MullerLyer,
    Ebbinghaus,
    Ponzo,
    Jastrow,
    VerticalHorizontal,
    Delboeuf,
    Sander,
    Baldwin,
}

impl IllusionFamily {
    pub const ALL: [Self; 8] = [
        Self::MullerLyer,
        Self::Ebbinghaus,
        Self::Ponzo,
        Self::Jastrow,
        Self::VerticalHorizontal,
        Self::Delboeuf,
        Self::Sander,
        Self::Baldwin,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MullerLyer => "mullerLyer",
            Self::Ebbinghaus => "ebbinghaus",
            Self::Ponzo => "ponzo",
            Self::Jastrow => "jastrow",
            Self::VerticalHorizontal => "verticalHorizontal",
            Self::Delboeuf => "delboeuf",
            Self::Sander => "sander",
            Self::Baldwin => "baldwin",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MullerLyer => "Müller-Lyer",
            Self::Ebbinghaus => "Ebbinghaus",
            Self::Ponzo => "Ponzo",
            Self::Jastrow => "Jastrow",
            Self::VerticalHorizontal => "Vertical-Horizontal",
            Self::Delboeuf => "Delboeuf",
            Self::Sander => "Sander",
            Self::Baldwin => "Baldwin",
        }
    }

    /// Reveal text explaining why the figure misleads.
    #[must_use]
    pub const fn explanation(self) -> &'static str {
        match self {
            Self::MullerLyer => {
                "Outward-pointing fins stretch a line and inward fins squeeze it, even when the shafts match."
            }
            Self::Ebbinghaus => {
                "A circle ringed by small circles looks bigger than one ringed by large circles."
            }
            Self::Ponzo => {
                "Converging rails read as depth, so the bar nearer the vanishing point looks farther and larger."
            }
            Self::Jastrow => {
                "Stacked arcs are compared edge to edge, so the short inner edge makes the neighbour look bigger."
            }
            Self::VerticalHorizontal => {
                "Vertical lines are overestimated relative to horizontal lines of the same length."
            }
            Self::Delboeuf => {
                "A tight outer ring inflates a disc while a loose ring makes the same disc look smaller."
            }
            Self::Sander => {
                "The diagonal inside the larger parallelogram looks longer than the one in the smaller half."
            }
            Self::Baldwin => {
                "A line between small squares looks longer than the same line between large squares."
            }
        }
    }
}

impl fmt::Display for IllusionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named real-world subject with reference facts shown in hints and reveals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub country: String,
    pub height_m: f64,
}

/// Normalized point of interest inside the stage image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPosition {
    pub x: f64,
    pub y: f64,
}

impl Default for TargetPosition {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

/// Truth for a numeric-distance stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceTruth {
    pub question: String,
    pub correct_distance_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_height_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub target: TargetPosition,
}

/// Renderer payload for a paired depth comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonScene {
    pub trick_a: SceneTrick,
    pub trick_b: SceneTrick,
    /// Geometric mean of the two distances; lets the renderer draw both
    /// targets on one scale without leaking which one is closer.
    pub normalization_reference: f64,
    pub seed_a: u32,
    pub seed_b: u32,
}

/// Renderer payload for a size-illusion figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IllusionFigure {
    pub family: IllusionFamily,
    pub illusion_strength: f64,
    /// Side the figure makes look larger.
    pub illusion_favors: Side,
    pub seed: u32,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scene", rename_all = "lowercase")]
pub enum ChoicePayload {
    Comparison(ComparisonScene),
    Illusion(IllusionFigure),
}

/// Truth for a two-alternative choice stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceTruth {
    pub question: String,
    pub correct_choice: Choice,
    /// Magnitudes shown on reveal: meters for comparisons, figure units for illusions.
    pub magnitude_a: f64,
    pub magnitude_b: f64,
    pub payload: ChoicePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StageAnswer {
    Distance(DistanceTruth),
    Choice(ChoiceTruth),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    Distance,
    Choice,
}

/// Atomic, immutable unit of play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    /// Display and collection name.
    pub name: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub answer: StageAnswer,
}

impl Stage {
    #[must_use]
    pub const fn kind(&self) -> AnswerKind {
        match self.answer {
            StageAnswer::Distance(_) => AnswerKind::Distance,
            StageAnswer::Choice(_) => AnswerKind::Choice,
        }
    }

    #[must_use]
    pub fn question(&self) -> &str {
        match &self.answer {
            StageAnswer::Distance(truth) => &truth.question,
            StageAnswer::Choice(truth) => &truth.question,
        }
    }

    #[must_use]
    pub const fn distance_truth(&self) -> Option<&DistanceTruth> {
        match &self.answer {
            StageAnswer::Distance(truth) => Some(truth),
            StageAnswer::Choice(_) => None,
        }
    }

    #[must_use]
    pub const fn choice_truth(&self) -> Option<&ChoiceTruth> {
        match &self.answer {
            StageAnswer::Choice(truth) => Some(truth),
            StageAnswer::Distance(_) => None,
        }
    }

    #[must_use]
    pub fn subject(&self) -> Option<&Subject> {
        self.distance_truth().and_then(|truth| truth.subject.as_ref())
    }

    #[must_use]
    pub fn correct_height(&self) -> Option<f64> {
        self.distance_truth().and_then(|truth| truth.correct_height_m)
    }

    /// Whether submitting this stage teaches the player its subject's height.
    #[must_use]
    pub fn teaches_height(&self) -> bool {
        self.subject().is_some() && self.correct_height().is_some()
    }
}
