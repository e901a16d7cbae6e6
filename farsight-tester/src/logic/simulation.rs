use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;

use farsight_game::{
    Category, LeaderboardClient, LeaderboardEntry, Phase, PlayerProfile, ProgressStorage,
    QuizConfig, QuizEngine, ResultDetail, StageAnswer, TransitionOutcome,
};

use super::policy::{PlayStrategy, PlayerPolicy};

/// Storage that keeps nothing between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStorage;

impl ProgressStorage for NullStorage {
    type Error = Infallible;

    fn load_profile(&self) -> Result<Option<PlayerProfile>, Self::Error> {
        Ok(None)
    }

    fn load_best_scores(&self) -> Result<BTreeMap<String, u8>, Self::Error> {
        Ok(BTreeMap::new())
    }

    fn save_profile(&self, _profile: &PlayerProfile) -> Result<(), Self::Error> {
        Ok(())
    }

    fn save_best_scores(&self, _scores: &BTreeMap<String, u8>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Leaderboard that drops every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBoard;

impl LeaderboardClient for NullBoard {
    type Error = Infallible;

    fn submit(&self, _entry: &LeaderboardEntry) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub type SimulatedEngine = QuizEngine<NullStorage, NullBoard>;

/// Outcome of one simulated run through a category.
#[derive(Debug, Clone, Serialize)]
pub struct PlaySummary {
    pub category: Category,
    pub strategy: String,
    pub stages_played: usize,
    pub total_score: u64,
    pub perfect_stages: usize,
    pub zero_stages: usize,
    pub height_known_stages: usize,
}

impl PlaySummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_score(&self) -> f64 {
        if self.stages_played == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.stages_played as f64
    }
}

/// Build an engine for `config` with throwaway collaborators.
pub fn simulated_engine(config: QuizConfig) -> Result<SimulatedEngine> {
    QuizEngine::load(config, NullStorage, NullBoard)
}

/// Play every stage of `category` once with `policy`, checking each transition.
pub fn play_category(
    engine: &mut SimulatedEngine,
    category: Category,
    strategy: PlayStrategy,
    policy: &mut dyn PlayerPolicy,
) -> Result<PlaySummary> {
    engine.open_categories();
    if engine.select_category(category).is_rejected() {
        bail!("{category} could not be selected");
    }

    let count = engine.catalog().count_in(category);
    let mut summary = PlaySummary {
        category,
        strategy: strategy.label().to_string(),
        stages_played: 0,
        total_score: 0,
        perfect_stages: 0,
        zero_stages: 0,
        height_known_stages: 0,
    };

    for position in 0..count {
        let stage = engine
            .current_stage()
            .with_context(|| format!("{category} has no stage at {position}"))?
            .clone();
        let outcome = match &stage.answer {
            StageAnswer::Distance(truth) => {
                let guess = policy.guess_distance(&stage, truth);
                engine.submit_distance(guess.distance_m, guess.height_m)
            }
            StageAnswer::Choice(truth) => {
                let choice = policy.pick_choice(&stage, truth);
                engine.submit_choice(choice)
            }
        };
        let result = match outcome {
            TransitionOutcome::Submitted(result) => result,
            other => bail!("{} refused the answer for {}: {other:?}", policy.name(), stage.id),
        };
        if result.stage_id != stage.id {
            bail!("scored {} while {} was active", result.stage_id, stage.id);
        }

        summary.stages_played += 1;
        summary.total_score += u64::from(result.score);
        match result.score {
            100 => summary.perfect_stages += 1,
            0 => summary.zero_stages += 1,
            _ => {}
        }
        if let ResultDetail::Distance(detail) = &result.detail
            && detail.height_known
        {
            summary.height_known_stages += 1;
        }

        if engine.reveal_complete().is_rejected() || engine.session().phase() != Phase::Scored {
            bail!("reveal did not settle for {}", stage.id);
        }
        if engine.session().total_score() != summary.total_score {
            bail!(
                "session total {} drifted from summed scores {}",
                engine.session().total_score(),
                summary.total_score
            );
        }
        engine.next_stage();
    }

    if engine.session().position() != 0 {
        bail!("{category} did not wrap back to the first stage");
    }

    Ok(summary)
}
