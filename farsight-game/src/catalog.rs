//! The full stage catalog: hand-authored stages plus both procedural sets.
use log::{error, info};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::hash::Hasher;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use twox_hash::XxHash64;

use crate::comparison;
use crate::config::{CatalogConfig, ConfigError};
use crate::illusion;
use crate::landmarks::{LandmarkData, SkytreeData};
use crate::stage::{Category, Choice, ChoicePayload, Stage, StageAnswer};

pub type CategoryList = SmallVec<[CategorySummary; 4]>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog configuration")]
    Config(#[from] ConfigError),
    #[error("bundled {name} data failed to parse")]
    Data {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog contains no stages")]
    Empty,
    #[error("duplicate stage id `{0}`")]
    DuplicateId(String),
    #[error("stage `{id}` has a non-positive {field} ({value})")]
    NonPositive {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("stage `{id}` answer shape does not fit category {category}")]
    ShapeMismatch { id: String, category: Category },
    #[error("stage `{id}` marks {choice} correct but its magnitudes disagree")]
    WrongChoice { id: String, choice: Choice },
    #[error("stage `{id}` illusion favors the correct side")]
    IllusionFavorsTruth { id: String },
    #[error("stage `{id}` illusion strength {value} is outside [0, 1]")]
    StrengthOutOfRange { id: String, value: f64 },
}

/// Derived view of one category; counts always come from membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub label: String,
    pub icon: String,
    pub description: String,
    pub stage_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCatalog {
    config: CatalogConfig,
    stages: Vec<Stage>,
}

impl StageCatalog {
    /// Build and validate a catalog from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the configuration is out of range, bundled
    /// data fails to parse, or the assembled catalog is inconsistent.
    pub fn build(config: &CatalogConfig) -> Result<Self, CatalogError> {
        config.validate()?;
        let landmarks = LandmarkData::load_from_static().map_err(|source| CatalogError::Data {
            name: "landmark",
            source,
        })?;
        let skytree = SkytreeData::load_from_static().map_err(|source| CatalogError::Data {
            name: "skytree",
            source,
        })?;

        let mut stages = landmarks.into_stages();
        stages.extend(skytree.into_stages());
        stages.extend(comparison::generate(
            config.comparison_seed,
            config.comparison_count,
        ));
        stages.extend(illusion::generate(config.illusion_seed, config.illusion_count));

        let catalog = Self {
            config: config.clone(),
            stages,
        };
        catalog.validate()?;
        info!(
            "built stage catalog: {} stages, fingerprint {:016x}",
            catalog.len(),
            catalog.fingerprint()
        );
        Ok(catalog)
    }

    /// Assemble a catalog from explicit stages.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the stages fail validation.
    pub fn from_stages(config: CatalogConfig, stages: Vec<Stage>) -> Result<Self, CatalogError> {
        let catalog = Self { config, stages };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Process-wide catalog built from the default configuration.
    #[must_use]
    pub fn standard() -> Arc<Self> {
        static CATALOG: OnceLock<Arc<StageCatalog>> = OnceLock::new();
        Arc::clone(CATALOG.get_or_init(|| {
            let config = CatalogConfig::default();
            let catalog = Self::build(&config).unwrap_or_else(|err| {
                error!("standard catalog failed to build: {err}");
                Self {
                    config,
                    stages: Vec::new(),
                }
            });
            Arc::new(catalog)
        }))
    }

    #[must_use]
    pub const fn config(&self) -> &CatalogConfig {
        &self.config
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    #[must_use]
    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == id)
    }

    /// Stages of one category in catalog order.
    #[must_use]
    pub fn stages_in(&self, category: Category) -> Vec<&Stage> {
        self.stages
            .iter()
            .filter(|stage| stage.category == category)
            .collect()
    }

    #[must_use]
    pub fn count_in(&self, category: Category) -> usize {
        self.stages
            .iter()
            .filter(|stage| stage.category == category)
            .count()
    }

    /// Stage at `position` within a category's filtered list.
    #[must_use]
    pub fn stage_at(&self, category: Category, position: usize) -> Option<&Stage> {
        self.stages
            .iter()
            .filter(|stage| stage.category == category)
            .nth(position)
    }

    /// Non-empty categories with their derived summaries.
    #[must_use]
    pub fn categories(&self) -> CategoryList {
        Category::ALL
            .iter()
            .filter_map(|&category| {
                let stage_count = self.count_in(category);
                (stage_count > 0).then(|| CategorySummary {
                    category,
                    label: category.label().to_string(),
                    icon: category.icon().to_string(),
                    description: category.description().to_string(),
                    stage_count,
                })
            })
            .collect()
    }

    /// XxHash64 over the serialized stage list.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        fingerprint_stages(&self.stages)
    }

    /// Check catalog-wide invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.stages.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(self.stages.len());
        for stage in &self.stages {
            if !seen.insert(stage.id.as_str()) {
                return Err(CatalogError::DuplicateId(stage.id.clone()));
            }
            validate_stage(stage)?;
        }
        Ok(())
    }
}

/// XxHash64 fingerprint of any stage slice.
#[must_use]
pub fn fingerprint_stages(stages: &[Stage]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for stage in stages {
        // Stage serialization cannot fail: every field is plain data.
        if let Ok(bytes) = serde_json::to_vec(stage) {
            hasher.write(&bytes);
        }
    }
    hasher.finish()
}

fn positive(id: &str, field: &'static str, value: f64) -> Result<(), CatalogError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CatalogError::NonPositive {
            id: id.to_string(),
            field,
            value,
        })
    }
}

fn validate_stage(stage: &Stage) -> Result<(), CatalogError> {
    let id = stage.id.as_str();
    let mismatch = || CatalogError::ShapeMismatch {
        id: id.to_string(),
        category: stage.category,
    };
    match (&stage.answer, stage.category) {
        (StageAnswer::Distance(truth), Category::Landmark | Category::Skytree) => {
            positive(id, "correct_distance_m", truth.correct_distance_m)?;
            if let Some(height) = truth.correct_height_m {
                positive(id, "correct_height_m", height)?;
            }
            Ok(())
        }
        (StageAnswer::Choice(truth), Category::Comparison | Category::Illusion) => {
            positive(id, "magnitude_a", truth.magnitude_a)?;
            positive(id, "magnitude_b", truth.magnitude_b)?;
            let matches_magnitudes = match (&truth.payload, truth.correct_choice) {
                (ChoicePayload::Comparison(_), Choice::A) => truth.magnitude_a <= truth.magnitude_b,
                (ChoicePayload::Comparison(_), Choice::B) => truth.magnitude_b < truth.magnitude_a,
                (ChoicePayload::Comparison(_), Choice::Same) => false,
                (ChoicePayload::Illusion(_), Choice::A) => truth.magnitude_a > truth.magnitude_b,
                (ChoicePayload::Illusion(_), Choice::B) => truth.magnitude_b > truth.magnitude_a,
                (ChoicePayload::Illusion(_), Choice::Same) => {
                    (truth.magnitude_a - truth.magnitude_b).abs() < f64::EPSILON
                }
            };
            if !matches_magnitudes {
                return Err(CatalogError::WrongChoice {
                    id: id.to_string(),
                    choice: truth.correct_choice,
                });
            }
            match (&truth.payload, stage.category) {
                (ChoicePayload::Comparison(scene), Category::Comparison) => {
                    positive(id, "normalization_reference", scene.normalization_reference)
                }
                (ChoicePayload::Illusion(figure), Category::Illusion) => {
                    if !(0.0..=1.0).contains(&figure.illusion_strength) {
                        return Err(CatalogError::StrengthOutOfRange {
                            id: id.to_string(),
                            value: figure.illusion_strength,
                        });
                    }
                    if truth.correct_choice != Choice::Same
                        && figure.illusion_favors.as_choice() == truth.correct_choice
                    {
                        return Err(CatalogError::IllusionFavorsTruth { id: id.to_string() });
                    }
                    Ok(())
                }
                _ => Err(mismatch()),
            }
        }
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::stage::{DistanceTruth, TargetPosition};

    fn distance_stage(id: &str, distance: f64) -> Stage {
        Stage {
            id: id.to_string(),
            name: id.to_string(),
            category: Category::Landmark,
            difficulty: Difficulty::Easy,
            answer: StageAnswer::Distance(DistanceTruth {
                question: "How far?".to_string(),
                correct_distance_m: distance,
                correct_height_m: None,
                subject: None,
                hint: None,
                image: None,
                target: TargetPosition::default(),
            }),
        }
    }

    #[test]
    fn standard_catalog_has_every_category() {
        let catalog = StageCatalog::standard();
        let categories = catalog.categories();
        assert_eq!(categories.len(), 4);
        let counts: Vec<usize> = categories.iter().map(|c| c.stage_count).collect();
        assert_eq!(counts, vec![18, 15, 50, 50]);
        assert_eq!(catalog.len(), 133);
        assert!(Arc::ptr_eq(&catalog, &StageCatalog::standard()));
    }

    #[test]
    fn lookup_by_id_and_position() {
        let catalog = StageCatalog::standard();
        assert_eq!(
            catalog.stage("compare-07").map(|s| s.category),
            Some(Category::Comparison)
        );
        assert!(catalog.stage("compare-51").is_none());
        let third = catalog.stage_at(Category::Illusion, 2).unwrap();
        assert_eq!(third.id, "illusion-03");
        assert!(catalog.stage_at(Category::Illusion, 50).is_none());
        assert_eq!(catalog.stages_in(Category::Landmark)[0].id, "eiffel-trocadero");
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = StageCatalog::build(&CatalogConfig::default()).unwrap();
        let b = StageCatalog::build(&CatalogConfig::default()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        let reseeded = StageCatalog::build(&CatalogConfig::with_seeds(1, 2)).unwrap();
        assert_ne!(a.fingerprint(), reseeded.fingerprint());
    }

    #[test]
    fn validation_rejects_bad_stages() {
        let config = CatalogConfig::default();
        assert!(matches!(
            StageCatalog::from_stages(config.clone(), Vec::new()),
            Err(CatalogError::Empty)
        ));
        let dup = vec![distance_stage("x", 10.0), distance_stage("x", 20.0)];
        assert!(matches!(
            StageCatalog::from_stages(config.clone(), dup),
            Err(CatalogError::DuplicateId(id)) if id == "x"
        ));
        let zero = vec![distance_stage("zero", 0.0)];
        assert!(matches!(
            StageCatalog::from_stages(config.clone(), zero),
            Err(CatalogError::NonPositive { .. })
        ));
        let mut misplaced = distance_stage("misplaced", 10.0);
        misplaced.category = Category::Illusion;
        assert!(matches!(
            StageCatalog::from_stages(config, vec![misplaced]),
            Err(CatalogError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_categories_are_not_listed() {
        let catalog =
            StageCatalog::from_stages(CatalogConfig::default(), vec![distance_stage("only", 5.0)])
                .unwrap();
        let categories = catalog.categories();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].category, Category::Landmark);
        assert_eq!(categories[0].stage_count, 1);
    }

    #[test]
    fn out_of_range_config_is_rejected() {
        let config = CatalogConfig {
            illusion_count: 0,
            ..CatalogConfig::default()
        };
        assert!(matches!(
            StageCatalog::build(&config),
            Err(CatalogError::Config(_))
        ));
    }
}
