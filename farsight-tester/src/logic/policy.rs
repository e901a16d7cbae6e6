use std::fmt;

use farsight_game::{Choice, ChoicePayload, ChoiceTruth, DistanceTruth, Stage};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Guess submitted for a numeric stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceGuess {
    pub distance_m: f64,
    pub height_m: Option<f64>,
}

/// Policy interface for automated play.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    fn guess_distance(&mut self, stage: &Stage, truth: &DistanceTruth) -> DistanceGuess;

    fn pick_choice(&mut self, stage: &Stage, truth: &ChoiceTruth) -> Choice;
}

/// Built-in play strategies for simulated sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayStrategy {
    Perfect,
    Noisy,
    Fooled,
    Random,
}

impl PlayStrategy {
    pub const ALL: [Self; 4] = [Self::Perfect, Self::Noisy, Self::Fooled, Self::Random];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Noisy => "Noisy",
            Self::Fooled => "Fooled",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Noisy => Box::new(NoisyPolicy::new(seed)),
            Self::Fooled => Box::new(FooledPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for PlayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct PerfectPolicy;
struct FooledPolicy;

struct NoisyPolicy {
    rng: SmallRng,
    spread: f64,
    accuracy: f64,
}

impl NoisyPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            spread: 0.3,
            accuracy: 0.7,
        }
    }
}

struct RandomPolicy {
    rng: SmallRng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

fn true_height(truth: &DistanceTruth) -> Option<f64> {
    truth
        .correct_height_m
        .or_else(|| truth.subject.as_ref().map(|subject| subject.height_m))
}

const fn opposite(choice: Choice) -> Choice {
    match choice {
        Choice::A => Choice::B,
        Choice::B | Choice::Same => Choice::A,
    }
}

impl PlayerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn guess_distance(&mut self, _stage: &Stage, truth: &DistanceTruth) -> DistanceGuess {
        DistanceGuess {
            distance_m: truth.correct_distance_m,
            height_m: true_height(truth),
        }
    }

    fn pick_choice(&mut self, _stage: &Stage, truth: &ChoiceTruth) -> Choice {
        truth.correct_choice
    }
}

impl PlayerPolicy for NoisyPolicy {
    fn name(&self) -> &'static str {
        "Noisy"
    }

    fn guess_distance(&mut self, _stage: &Stage, truth: &DistanceTruth) -> DistanceGuess {
        let spread = self.spread;
        let mut jitter = |value: f64| value * (1.0 + self.rng.gen_range(-spread..spread));
        let distance_m = jitter(truth.correct_distance_m);
        let height_m = true_height(truth).map(jitter);
        DistanceGuess {
            distance_m,
            height_m,
        }
    }

    fn pick_choice(&mut self, _stage: &Stage, truth: &ChoiceTruth) -> Choice {
        if self.rng.gen_bool(self.accuracy) {
            truth.correct_choice
        } else {
            opposite(truth.correct_choice)
        }
    }
}

impl PlayerPolicy for FooledPolicy {
    fn name(&self) -> &'static str {
        "Fooled"
    }

    /// Overestimates everything twofold.
    fn guess_distance(&mut self, _stage: &Stage, truth: &DistanceTruth) -> DistanceGuess {
        DistanceGuess {
            distance_m: truth.correct_distance_m * 2.0,
            height_m: true_height(truth).map(|h| h * 2.0),
        }
    }

    /// Trusts the figure on illusions and the wrong object on comparisons.
    fn pick_choice(&mut self, _stage: &Stage, truth: &ChoiceTruth) -> Choice {
        match &truth.payload {
            ChoicePayload::Illusion(figure) => {
                let favored = figure.illusion_favors.as_choice();
                if favored == truth.correct_choice {
                    Choice::Same
                } else {
                    favored
                }
            }
            ChoicePayload::Comparison(_) => opposite(truth.correct_choice),
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn guess_distance(&mut self, _stage: &Stage, truth: &DistanceTruth) -> DistanceGuess {
        let distance_m = truth.correct_distance_m * self.rng.gen_range(0.0..2.0);
        let height_m = true_height(truth).map(|h| h * self.rng.gen_range(0.0..2.0));
        DistanceGuess {
            distance_m,
            height_m,
        }
    }

    fn pick_choice(&mut self, _stage: &Stage, truth: &ChoiceTruth) -> Choice {
        let options: &[Choice] = match truth.payload {
            ChoicePayload::Illusion(_) => &[Choice::A, Choice::B, Choice::Same],
            ChoicePayload::Comparison(_) => &[Choice::A, Choice::B],
        };
        options[self.rng.gen_range(0..options.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farsight_game::{Category, StageCatalog};

    #[test]
    fn perfect_policy_answers_every_choice_correctly() {
        let catalog = StageCatalog::standard();
        let mut policy = PlayStrategy::Perfect.create_policy(1);
        for stage in catalog.stages_in(Category::Illusion) {
            let truth = stage.choice_truth().unwrap();
            assert_eq!(policy.pick_choice(stage, truth), truth.correct_choice);
        }
    }

    #[test]
    fn fooled_policy_never_answers_a_choice_correctly() {
        let catalog = StageCatalog::standard();
        let mut policy = PlayStrategy::Fooled.create_policy(1);
        for category in [Category::Comparison, Category::Illusion] {
            for stage in catalog.stages_in(category) {
                let truth = stage.choice_truth().unwrap();
                assert_ne!(policy.pick_choice(stage, truth), truth.correct_choice);
            }
        }
    }

    #[test]
    fn noisy_guesses_stay_within_spread() {
        let catalog = StageCatalog::standard();
        let mut policy = PlayStrategy::Noisy.create_policy(7);
        for stage in catalog.stages_in(Category::Skytree) {
            let truth = stage.distance_truth().unwrap();
            let guess = policy.guess_distance(stage, truth);
            let ratio = guess.distance_m / truth.correct_distance_m;
            assert!((0.7..=1.3).contains(&ratio));
            assert!(guess.height_m.is_some());
        }
    }

    #[test]
    fn random_policy_spreads_over_every_option() {
        let catalog = StageCatalog::standard();
        let mut policy = PlayStrategy::Random.create_policy(11);
        let mut picks = std::collections::BTreeMap::new();
        for _ in 0..20 {
            for stage in catalog.stages_in(Category::Illusion) {
                let truth = stage.choice_truth().unwrap();
                *picks.entry(policy.pick_choice(stage, truth).as_str()).or_insert(0usize) += 1;
            }
        }
        assert_eq!(picks.len(), 3);
        // 1000 draws over three options; each lands well inside (250, 420).
        assert!(picks.values().all(|&n| (250..420).contains(&n)), "{picks:?}");

        for stage in catalog.stages_in(Category::Comparison) {
            let truth = stage.choice_truth().unwrap();
            assert_ne!(policy.pick_choice(stage, truth), Choice::Same);
        }
    }

    #[test]
    fn random_guesses_stay_below_double_the_truth() {
        let catalog = StageCatalog::standard();
        let mut policy = PlayStrategy::Random.create_policy(5);
        for stage in catalog.stages_in(Category::Landmark) {
            let truth = stage.distance_truth().unwrap();
            let guess = policy.guess_distance(stage, truth);
            assert!((0.0..2.0 * truth.correct_distance_m).contains(&guess.distance_m));
        }
    }

    #[test]
    fn labels_match_policy_names() {
        for strategy in PlayStrategy::ALL {
            assert_eq!(strategy.create_policy(0).name(), strategy.label());
        }
    }
}
