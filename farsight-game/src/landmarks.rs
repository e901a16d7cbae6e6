//! Hand-authored numeric-distance stages: world landmarks and Skytree viewpoints.
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::geo::Coordinate;
use crate::numbers::round_magnitude;
use crate::stage::{Category, DistanceTruth, Stage, StageAnswer, Subject, TargetPosition};

const DEFAULT_LANDMARK_DATA: &str = include_str!("../data/landmarks.json");
const DEFAULT_SKYTREE_DATA: &str = include_str!("../data/skytree.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkDef {
    pub id: String,
    pub name: String,
    pub question: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub target: TargetPosition,
    pub correct_distance_m: f64,
    pub difficulty: Difficulty,
    pub subject: Subject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LandmarkData {
    #[serde(default)]
    pub stages: Vec<LandmarkDef>,
}

impl LandmarkData {
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into landmark data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns an error if the bundled landmark data fails to parse.
    pub fn load_from_static() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_LANDMARK_DATA)
    }

    #[must_use]
    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
            .into_iter()
            .map(|def| Stage {
                id: def.id,
                name: def.name,
                category: Category::Landmark,
                difficulty: def.difficulty,
                answer: StageAnswer::Distance(DistanceTruth {
                    question: def.question,
                    correct_distance_m: def.correct_distance_m,
                    correct_height_m: None,
                    subject: Some(def.subject),
                    hint: def.hint,
                    image: def.image,
                    target: def.target,
                }),
            })
            .collect()
    }
}

/// Photographer's rating of a viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl SpotLevel {
    #[must_use]
    pub const fn difficulty(self) -> Difficulty {
        match self {
            Self::Beginner => Difficulty::Easy,
            Self::Intermediate => Difficulty::Normal,
            Self::Advanced => Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerDef {
    pub name: String,
    pub country: String,
    pub height_m: f64,
    pub position: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotDef {
    pub id: String,
    pub name: String,
    pub position: Coordinate,
    pub level: SpotLevel,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkytreeData {
    pub tower: TowerDef,
    #[serde(default)]
    pub spots: Vec<SpotDef>,
}

impl SkytreeData {
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into viewpoint data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns an error if the bundled viewpoint data fails to parse.
    pub fn load_from_static() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_SKYTREE_DATA)
    }

    /// Distance from a viewpoint to the tower, rounded to whole meters.
    #[must_use]
    pub fn distance_from(&self, spot: &SpotDef) -> f64 {
        round_magnitude(self.tower.position.distance_to(spot.position), 1.0)
    }

    #[must_use]
    pub fn into_stages(self) -> Vec<Stage> {
        let subject = Subject {
            name: self.tower.name.clone(),
            country: self.tower.country.clone(),
            height_m: self.tower.height_m,
        };
        let question = format!("How far away is {}?", self.tower.name);
        self.spots
            .iter()
            .map(|spot| Stage {
                id: spot.id.clone(),
                name: spot.name.clone(),
                category: Category::Skytree,
                difficulty: spot.level.difficulty(),
                answer: StageAnswer::Distance(DistanceTruth {
                    question: question.clone(),
                    correct_distance_m: self.distance_from(spot),
                    correct_height_m: Some(self.tower.height_m),
                    subject: Some(subject.clone()),
                    hint: spot.hint.clone(),
                    image: None,
                    target: TargetPosition::default(),
                }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_landmarks_parse() {
        let stages = LandmarkData::load_from_static().unwrap().into_stages();
        assert_eq!(stages.len(), 18);
        let fuji = stages.iter().find(|s| s.id == "fuji-kawaguchi").unwrap();
        assert_eq!(fuji.difficulty, Difficulty::Expert);
        assert_eq!(fuji.subject().map(|s| s.height_m), Some(3776.0));
        assert!(stages.iter().all(|s| s.correct_height().is_none()));
        assert!(stages.iter().all(|s| s.category == Category::Landmark));
    }

    #[test]
    fn viewpoints_measure_great_circle_distance() {
        let data = SkytreeData::load_from_static().unwrap();
        assert_eq!(data.spots.len(), 15);
        let stages = data.into_stages();
        let azuma = stages.iter().find(|s| s.id == "skytree-azuma-bridge").unwrap();
        let distance = azuma.distance_truth().unwrap().correct_distance_m;
        assert!((distance - 903.0).abs() <= 1.0, "got {distance}");
        assert!(stages.iter().all(|s| s.teaches_height()));
        assert!(stages.iter().all(|s| s.correct_height() == Some(634.0)));
        let odaiba = stages.iter().find(|s| s.id == "skytree-odaiba").unwrap();
        assert_eq!(odaiba.difficulty, Difficulty::Hard);
        assert!(odaiba.distance_truth().unwrap().correct_distance_m > 8_000.0);
    }

    #[test]
    fn spot_levels_map_onto_difficulty() {
        assert_eq!(SpotLevel::Beginner.difficulty(), Difficulty::Easy);
        assert_eq!(SpotLevel::Intermediate.difficulty(), Difficulty::Normal);
        assert_eq!(SpotLevel::Advanced.difficulty(), Difficulty::Hard);
    }
}
