//! Farsight Quiz Engine
//!
//! Platform-agnostic core logic for the Farsight perception quiz: seeded stage
//! generation, the session state machine, scoring, and progress tracking.
//! Rendering, persistence, and the leaderboard backend are supplied by the host.

pub mod catalog;
pub mod comparison;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod geo;
pub mod illusion;
pub mod landmarks;
pub mod numbers;
pub mod profile;
pub mod progress;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod stage;

use anyhow::Context;
use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;

// Re-export commonly used types
pub use catalog::{CatalogError, CategoryList, CategorySummary, StageCatalog, fingerprint_stages};
pub use config::{CatalogConfig, ConfigError, QuizConfig, ScoringConfig};
pub use difficulty::{BandPlacement, Difficulty, gap_fraction, illusion_strength, place};
pub use geo::Coordinate;
pub use profile::{LeaderboardEntry, PlayerProfile, ProfileError};
pub use progress::{CategoryCompletion, ProgressError, ProgressStore, RecordOutcome, ScoreBadge};
pub use rng::{ParkMillerStream, SequenceGenerator, XorShiftStream, derive_stage_seed};
pub use scoring::{ResultDetail, ResultTier, StageResult, score_choice, score_distance};
pub use session::{
    Phase, PendingAnswer, RejectReason, Session, SessionContext, SessionEvent, Transition,
    TransitionOutcome,
};
pub use stage::{
    AnswerKind, Category, Choice, ChoicePayload, ChoiceTruth, ComparisonScene, DistanceTruth,
    IllusionFamily, IllusionFigure, SceneTrick, Side, Stage, StageAnswer, Subject,
};

/// Trait for abstracting key-value persistence of player data
/// Platform-specific implementations should provide this
pub trait ProgressStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the saved player profile
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read.
    fn load_profile(&self) -> Result<Option<PlayerProfile>, Self::Error>;

    /// Load the best score per stage id
    ///
    /// # Errors
    ///
    /// Returns an error if the scores cannot be read.
    fn load_best_scores(&self) -> Result<BTreeMap<String, u8>, Self::Error>;

    /// Persist the player profile
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be written.
    fn save_profile(&self, profile: &PlayerProfile) -> Result<(), Self::Error>;

    /// Persist the best score per stage id
    ///
    /// # Errors
    ///
    /// Returns an error if the scores cannot be written.
    fn save_best_scores(&self, scores: &BTreeMap<String, u8>) -> Result<(), Self::Error>;
}

/// Trait for the remote leaderboard; submissions are fire-and-forget
pub trait LeaderboardClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit one scored stage
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot receive the entry.
    fn submit(&self, entry: &LeaderboardEntry) -> Result<(), Self::Error>;
}

/// Main quiz engine binding catalog, session, progress, and host collaborators
pub struct QuizEngine<S, L>
where
    S: ProgressStorage,
    L: LeaderboardClient,
{
    config: QuizConfig,
    catalog: Arc<StageCatalog>,
    session: Session,
    progress: ProgressStore,
    profile: Option<PlayerProfile>,
    storage: S,
    leaderboard: L,
}

impl<S, L> QuizEngine<S, L>
where
    S: ProgressStorage,
    L: LeaderboardClient,
{
    /// Build the catalog for `config` and restore persisted player data.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the catalog fails to
    /// build, or persisted data cannot be read.
    pub fn load(config: QuizConfig, storage: S, leaderboard: L) -> anyhow::Result<Self> {
        config.validate().context("invalid quiz configuration")?;
        let catalog = if config.catalog == CatalogConfig::default() {
            StageCatalog::standard()
        } else {
            Arc::new(StageCatalog::build(&config.catalog).context("building stage catalog")?)
        };
        if catalog.is_empty() {
            anyhow::bail!("stage catalog is empty");
        }
        let best_scores = storage
            .load_best_scores()
            .context("loading best scores")?;
        let progress =
            ProgressStore::from_best_scores(best_scores).context("restoring best scores")?;
        let profile = storage.load_profile().context("loading player profile")?;
        Ok(Self {
            config,
            catalog,
            session: Session::new(),
            progress,
            profile,
            storage,
            leaderboard,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn categories(&self) -> CategoryList {
        self.catalog.categories()
    }

    #[must_use]
    pub fn current_stage(&self) -> Option<&Stage> {
        self.session.current_stage(&self.catalog)
    }

    #[must_use]
    pub const fn current_result(&self) -> Option<&StageResult> {
        self.session.result()
    }

    #[must_use]
    pub fn progress_for(&self, stage_id: &str) -> Option<u8> {
        self.progress.best_for(stage_id)
    }

    #[must_use]
    pub fn completion(&self, category: Category) -> CategoryCompletion {
        self.progress.completion(&self.catalog, category)
    }

    /// Replace the player profile and write it through to storage.
    pub fn set_player_profile(&mut self, profile: PlayerProfile) {
        if let Err(err) = self.storage.save_profile(&profile) {
            warn!("failed to save player profile: {err}");
        }
        self.profile = Some(profile);
    }

    pub fn open_categories(&mut self) -> TransitionOutcome {
        self.dispatch(SessionEvent::OpenCategories)
    }

    pub fn select_category(&mut self, category: Category) -> TransitionOutcome {
        self.dispatch(SessionEvent::SelectCategory(category))
    }

    pub fn set_distance_guess(&mut self, meters: f64) -> TransitionOutcome {
        self.dispatch(SessionEvent::SetDistanceGuess(meters))
    }

    pub fn set_height_guess(&mut self, meters: f64) -> TransitionOutcome {
        self.dispatch(SessionEvent::SetHeightGuess(meters))
    }

    pub fn select_choice(&mut self, choice: Choice) -> TransitionOutcome {
        self.dispatch(SessionEvent::SelectChoice(choice))
    }

    /// Submit the pending answer for the active stage.
    pub fn submit_answer(&mut self) -> TransitionOutcome {
        self.dispatch(SessionEvent::Submit)
    }

    /// Set the distance (and optionally height) guess, then submit.
    pub fn submit_distance(&mut self, meters: f64, height_m: Option<f64>) -> TransitionOutcome {
        let outcome = self.set_distance_guess(meters);
        if outcome.is_rejected() {
            return outcome;
        }
        if let Some(height) = height_m {
            let outcome = self.set_height_guess(height);
            if outcome.is_rejected() {
                return outcome;
            }
        }
        self.submit_answer()
    }

    /// Select a choice, then submit.
    pub fn submit_choice(&mut self, choice: Choice) -> TransitionOutcome {
        let outcome = self.select_choice(choice);
        if outcome.is_rejected() {
            return outcome;
        }
        self.submit_answer()
    }

    pub fn reveal_complete(&mut self) -> TransitionOutcome {
        self.dispatch(SessionEvent::RevealComplete)
    }

    pub fn next_stage(&mut self) -> TransitionOutcome {
        self.dispatch(SessionEvent::Next)
    }

    pub fn skip_stage(&mut self) -> TransitionOutcome {
        self.dispatch(SessionEvent::Skip)
    }

    pub fn previous_stage(&mut self) -> TransitionOutcome {
        self.dispatch(SessionEvent::Previous)
    }

    pub fn reset_session(&mut self) -> TransitionOutcome {
        self.dispatch(SessionEvent::Reset)
    }

    fn dispatch(&mut self, event: SessionEvent) -> TransitionOutcome {
        let ctx = SessionContext {
            catalog: &self.catalog,
            scoring: &self.config.scoring,
        };
        let Transition { session, outcome } = self.session.apply(&ctx, event);
        self.session = session;
        if let TransitionOutcome::Submitted(result) = &outcome {
            self.after_submission(result);
        }
        outcome
    }

    fn after_submission(&mut self, result: &StageResult) {
        if self.progress.record(&result.stage_id, result.score).improved()
            && let Err(err) = self.storage.save_best_scores(self.progress.best_scores())
        {
            warn!("failed to save best scores: {err}");
        }
        let Some(profile) = &self.profile else {
            return;
        };
        let Some(stage) = self.catalog.stage(&result.stage_id) else {
            return;
        };
        let entry = LeaderboardEntry::new(profile, stage, result);
        if let Err(err) = self.leaderboard.submit(&entry) {
            warn!("failed to submit score for {}: {err}", entry.stage_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        profile: Rc<RefCell<Option<PlayerProfile>>>,
        scores: Rc<RefCell<BTreeMap<String, u8>>>,
        saves: Rc<RefCell<usize>>,
    }

    impl ProgressStorage for MemoryStorage {
        type Error = Infallible;

        fn load_profile(&self) -> Result<Option<PlayerProfile>, Self::Error> {
            Ok(self.profile.borrow().clone())
        }

        fn load_best_scores(&self) -> Result<BTreeMap<String, u8>, Self::Error> {
            Ok(self.scores.borrow().clone())
        }

        fn save_profile(&self, profile: &PlayerProfile) -> Result<(), Self::Error> {
            *self.profile.borrow_mut() = Some(profile.clone());
            Ok(())
        }

        fn save_best_scores(&self, scores: &BTreeMap<String, u8>) -> Result<(), Self::Error> {
            *self.scores.borrow_mut() = scores.clone();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("leaderboard offline")]
    struct Offline;

    #[derive(Clone, Default)]
    struct RecordingBoard {
        entries: Rc<RefCell<Vec<LeaderboardEntry>>>,
        fail: bool,
    }

    impl LeaderboardClient for RecordingBoard {
        type Error = Offline;

        fn submit(&self, entry: &LeaderboardEntry) -> Result<(), Self::Error> {
            if self.fail {
                return Err(Offline);
            }
            self.entries.borrow_mut().push(entry.clone());
            Ok(())
        }
    }

    #[test]
    fn submissions_write_through_and_reach_leaderboard() {
        let storage = MemoryStorage::default();
        let board = RecordingBoard::default();
        let mut engine =
            QuizEngine::load(QuizConfig::default(), storage.clone(), board.clone()).unwrap();
        engine.set_player_profile(PlayerProfile::new("eye", "Japan", None).unwrap());

        assert_eq!(engine.select_category(Category::Landmark), TransitionOutcome::Applied);
        let outcome = engine.submit_distance(580.0, None);
        assert!(matches!(outcome, TransitionOutcome::Submitted(ref r) if r.score == 100));
        assert_eq!(engine.progress_for("eiffel-trocadero"), Some(100));
        assert_eq!(storage.scores.borrow().get("eiffel-trocadero"), Some(&100));
        assert!(storage.profile.borrow().is_some());

        let entries = board.entries.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stage_name, "Eiffel Tower (Trocadéro)");
        assert!(entries[0].distance_error.abs() < f64::EPSILON);
    }

    #[test]
    fn leaderboard_failure_never_touches_session() {
        let board = RecordingBoard {
            fail: true,
            ..RecordingBoard::default()
        };
        let mut engine = QuizEngine::load(QuizConfig::default(), MemoryStorage::default(), board)
            .unwrap();
        engine.set_player_profile(PlayerProfile::new("eye", "Japan", None).unwrap());
        engine.select_category(Category::Comparison);
        let correct = engine
            .current_stage()
            .and_then(Stage::choice_truth)
            .map(|truth| truth.correct_choice)
            .unwrap();
        let outcome = engine.submit_choice(correct);
        assert!(matches!(outcome, TransitionOutcome::Submitted(_)));
        assert_eq!(engine.session().phase(), Phase::Revealing);
        assert_eq!(engine.current_result().map(|r| r.score), Some(100));
    }

    #[test]
    fn persisted_scores_are_restored() {
        let storage = MemoryStorage::default();
        storage.scores.borrow_mut().insert("stonehenge".to_string(), 77);
        let engine =
            QuizEngine::load(QuizConfig::default(), storage, RecordingBoard::default()).unwrap();
        assert_eq!(engine.progress_for("stonehenge"), Some(77));
        assert_eq!(engine.categories().len(), 4);
    }

    #[test]
    fn only_improvements_are_saved() {
        let storage = MemoryStorage::default();
        let mut engine =
            QuizEngine::load(QuizConfig::default(), storage.clone(), RecordingBoard::default())
                .unwrap();
        engine.select_category(Category::Landmark);
        engine.submit_distance(580.0, None);
        engine.reveal_complete();
        engine.reset_session();
        engine.select_category(Category::Landmark);
        engine.submit_distance(1.0, None);
        assert_eq!(*storage.saves.borrow(), 1);
        assert_eq!(engine.progress_for("eiffel-trocadero"), Some(100));
        assert_eq!(engine.progress().total_score(), 100 + 20);
    }

    #[test]
    fn invalid_config_fails_to_load() {
        let config = QuizConfig {
            scoring: ScoringConfig {
                damping_factor: 0.0,
                ..ScoringConfig::default()
            },
            ..QuizConfig::default()
        };
        let err = QuizEngine::load(config, MemoryStorage::default(), RecordingBoard::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("invalid quiz configuration"));
    }
}
