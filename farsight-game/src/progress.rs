//! Best-score bookkeeping and the collection view built on it.
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::StageCatalog;
use crate::constants::{BADGE_BLUE_MIN, BADGE_GOLD_MIN, BADGE_GREEN_MIN, BADGE_ORANGE_MIN};
use crate::stage::Category;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress snapshot could not be decoded")]
    Decode(#[from] serde_json::Error),
    #[error("stored best score for `{id}` is {score}, above 100")]
    ScoreOutOfRange { id: String, score: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// New best; `previous` is the old best, if any.
    Improved { previous: Option<u8> },
    Unchanged,
}

impl RecordOutcome {
    #[must_use]
    pub const fn improved(self) -> bool {
        matches!(self, Self::Improved { .. })
    }
}

/// Best score per stage id plus the running total of every recorded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProgressStore {
    #[serde(default)]
    best_scores: BTreeMap<String, u8>,
    #[serde(default)]
    total_score: u64,
}

impl ProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from persisted best scores.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ScoreOutOfRange` if any stored score exceeds 100.
    pub fn from_best_scores(best_scores: BTreeMap<String, u8>) -> Result<Self, ProgressError> {
        Self::from_snapshot(Self {
            best_scores,
            total_score: 0,
        })
    }

    /// # Errors
    ///
    /// Returns `ProgressError::ScoreOutOfRange` if any stored score exceeds 100.
    pub fn from_snapshot(snapshot: Self) -> Result<Self, ProgressError> {
        if let Some((id, &score)) = snapshot.best_scores.iter().find(|(_, score)| **score > 100) {
            return Err(ProgressError::ScoreOutOfRange {
                id: id.clone(),
                score,
            });
        }
        Ok(snapshot)
    }

    /// # Errors
    ///
    /// Returns `ProgressError` if the JSON is malformed or holds an invalid score.
    pub fn from_json(json: &str) -> Result<Self, ProgressError> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Decode` if serialization fails.
    pub fn to_json(&self) -> Result<String, ProgressError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Record a result. The total always grows; the best only on strict improvement.
    pub fn record(&mut self, stage_id: &str, score: u8) -> RecordOutcome {
        let score = score.min(100);
        self.total_score = self.total_score.saturating_add(u64::from(score));
        let previous = self.best_scores.get(stage_id).copied();
        match previous {
            Some(best) if score <= best => RecordOutcome::Unchanged,
            _ => {
                self.best_scores.insert(stage_id.to_string(), score);
                info!("new best for {stage_id}: {score} (was {previous:?})");
                RecordOutcome::Improved { previous }
            }
        }
    }

    #[must_use]
    pub fn best_for(&self, stage_id: &str) -> Option<u8> {
        self.best_scores.get(stage_id).copied()
    }

    #[must_use]
    pub const fn best_scores(&self) -> &BTreeMap<String, u8> {
        &self.best_scores
    }

    #[must_use]
    pub const fn total_score(&self) -> u64 {
        self.total_score
    }

    /// How much of a category has been played.
    #[must_use]
    pub fn completion(&self, catalog: &StageCatalog, category: Category) -> CategoryCompletion {
        let stages = catalog.stages_in(category);
        let bests: Vec<u8> = stages
            .iter()
            .filter_map(|stage| self.best_for(&stage.id))
            .collect();
        CategoryCompletion {
            category,
            played: bests.len(),
            total: stages.len(),
            best_total: bests.iter().map(|&score| u64::from(score)).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCompletion {
    pub category: Category,
    pub played: usize,
    pub total: usize,
    pub best_total: u64,
}

impl CategoryCompletion {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total > 0 && self.played == self.total
    }
}

/// Collection badge grade for a best score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBadge {
    Gray,
    Orange,
    Green,
    Blue,
    Gold,
}

impl ScoreBadge {
    #[must_use]
    pub const fn for_score(score: u8) -> Self {
        if score >= BADGE_GOLD_MIN {
            Self::Gold
        } else if score >= BADGE_BLUE_MIN {
            Self::Blue
        } else if score >= BADGE_GREEN_MIN {
            Self::Green
        } else if score >= BADGE_ORANGE_MIN {
            Self::Orange
        } else {
            Self::Gray
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Orange => "orange",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Gold => "gold",
        }
    }
}
