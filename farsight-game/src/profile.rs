//! Player identity and the leaderboard entry built from it.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::PLAYER_NAME_MAX_CHARS;
use crate::scoring::StageResult;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("player name must be at most {max} characters (got {len})")]
    NameTooLong { max: usize, len: usize },
}

/// Decoded profiles go through the same name rule as [`PlayerProfile::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredProfile")]
pub struct PlayerProfile {
    name: String,
    country: String,
    prefecture: Option<String>,
}

/// Unchecked shape of a persisted profile.
#[derive(Deserialize)]
struct StoredProfile {
    name: String,
    country: String,
    #[serde(default)]
    prefecture: Option<String>,
}

impl TryFrom<StoredProfile> for PlayerProfile {
    type Error = ProfileError;

    fn try_from(stored: StoredProfile) -> Result<Self, Self::Error> {
        Self::new(&stored.name, stored.country, stored.prefecture)
    }
}

impl PlayerProfile {
    /// Build a profile; the name is trimmed and must be 1 to 12 characters.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` when the trimmed name is empty or too long.
    pub fn new(
        name: &str,
        country: impl Into<String>,
        prefecture: Option<String>,
    ) -> Result<Self, ProfileError> {
        let name = validate_name(name)?;
        Ok(Self {
            name,
            country: country.into(),
            prefecture: prefecture.filter(|p| !p.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[must_use]
    pub fn prefecture(&self) -> Option<&str> {
        self.prefecture.as_deref()
    }
}

/// Trim a player name and check its length in characters.
///
/// # Errors
///
/// Returns `ProfileError` when the trimmed name is empty or too long.
pub fn validate_name(raw: &str) -> Result<String, ProfileError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(ProfileError::EmptyName);
    }
    if len > PLAYER_NAME_MAX_CHARS {
        return Err(ProfileError::NameTooLong {
            max: PLAYER_NAME_MAX_CHARS,
            len,
        });
    }
    Ok(trimmed.to_string())
}

/// Payload handed to the leaderboard client after each submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub stage_id: String,
    pub stage_name: String,
    pub score: u8,
    pub distance_error: f64,
    pub country: String,
    pub prefecture: Option<String>,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn new(profile: &PlayerProfile, stage: &Stage, result: &StageResult) -> Self {
        Self {
            player_name: profile.name.clone(),
            stage_id: stage.id.clone(),
            stage_name: stage.name.clone(),
            score: result.score,
            distance_error: result.reported_error(),
            country: profile.country.clone(),
            prefecture: profile.prefecture.clone(),
        }
    }
}
