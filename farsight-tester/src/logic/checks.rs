use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use farsight_game::difficulty::{gap_band, tier_for};
use farsight_game::scoring::score_from_error;
use farsight_game::stage::TargetPosition;
use farsight_game::{
    CatalogConfig, Category, Choice, ChoicePayload, Difficulty, DistanceTruth, IllusionFamily,
    ProgressStore, QuizConfig, RecordOutcome, ResultTier, ScoringConfig, Side, Stage,
    StageCatalog, TransitionOutcome, comparison, gap_fraction, illusion, score_choice,
    score_distance,
};

use super::policy::PlayStrategy;
use super::seeds::SeedInfo;
use super::simulation::{PlaySummary, play_category, simulated_engine};

/// Favored-side samples per family needed before balance is judged.
const MIN_BALANCE_SAMPLE: usize = 200;
const BALANCE_TOLERANCE: f64 = 0.12;

/// Inputs shared by every check.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub seeds: &'a [SeedInfo],
    pub plays: usize,
    pub verbose: bool,
}

impl CheckContext<'_> {
    fn catalog_config(seed: SeedInfo) -> CatalogConfig {
        CatalogConfig::with_seeds(seed.seed, seed.illusion_seed())
    }
}

/// Failures and play summaries gathered while a check runs.
#[derive(Debug, Default)]
pub struct Findings {
    failures: Vec<String>,
    plays: Vec<PlaySummary>,
}

impl Findings {
    fn fail(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }
}

type CheckFn = fn(&CheckContext<'_>, &mut Findings);

/// A named property check.
pub struct CheckDef {
    pub key: &'static str,
    pub description: &'static str,
    run: CheckFn,
}

pub static CHECKS: [CheckDef; 7] = [
    CheckDef {
        key: "catalog-validity",
        description: "Catalogs build, validate and carry the configured stage counts",
        run: check_catalog_validity,
    },
    CheckDef {
        key: "determinism",
        description: "Same seed yields identical stages and fingerprints",
        run: check_determinism,
    },
    CheckDef {
        key: "monotonic-difficulty",
        description: "Tiers, gaps and illusion strength never ease along a catalog",
        run: check_monotonic_difficulty,
    },
    CheckDef {
        key: "illusion-bias",
        description: "Illusions never favor the correct side; comparisons pick the closer object",
        run: check_illusion_bias,
    },
    CheckDef {
        key: "family-balance",
        description: "Illusion families are evenly spread and favor both sides",
        run: check_family_balance,
    },
    CheckDef {
        key: "scoring-scenarios",
        description: "Reference scoring and progress scenarios",
        run: check_scoring_scenarios,
    },
    CheckDef {
        key: "session-walkthrough",
        description: "Simulated players walk every category through the session engine",
        run: check_session_walkthrough,
    },
];

pub fn list_checks() -> impl Iterator<Item = (&'static str, &'static str)> {
    CHECKS.iter().map(|check| (check.key, check.description))
}

#[must_use]
pub fn get_check(key: &str) -> Option<&'static CheckDef> {
    CHECKS.iter().find(|check| check.key == key)
}

/// Result of running one check across all seeds.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub check_name: String,
    pub description: String,
    pub passed: bool,
    pub seeds_run: usize,
    pub failures: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plays: Vec<PlaySummary>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

#[must_use]
pub fn run_check(check: &CheckDef, ctx: &CheckContext<'_>) -> CheckResult {
    if ctx.verbose {
        println!("🧪 Running check: {}", check.key.bright_white());
    }
    let start = Instant::now();
    let mut findings = Findings::default();
    (check.run)(ctx, &mut findings);
    let duration = start.elapsed();

    if ctx.verbose {
        for failure in &findings.failures {
            println!("  ❌ {}", failure.red());
        }
    }
    log::debug!(
        "check {} finished in {duration:?} with {} failures",
        check.key,
        findings.failures.len()
    );

    CheckResult {
        check_name: check.key.to_string(),
        description: check.description.to_string(),
        passed: findings.failures.is_empty(),
        seeds_run: ctx.seeds.len(),
        failures: findings.failures,
        plays: findings.plays,
        duration,
    }
}

/// Build the catalog for a seed, recording a failure when it does not build.
fn build_for(seed: SeedInfo, findings: &mut Findings) -> Option<StageCatalog> {
    match StageCatalog::build(&CheckContext::catalog_config(seed)) {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            findings.fail(format!("seed {}: catalog failed to build: {err}", seed.seed));
            None
        }
    }
}

fn check_catalog_validity(ctx: &CheckContext<'_>, findings: &mut Findings) {
    for &seed in ctx.seeds {
        let Some(catalog) = build_for(seed, findings) else {
            continue;
        };
        if let Err(err) = catalog.validate() {
            findings.fail(format!("seed {}: {err}", seed.seed));
        }
        let config = catalog.config();
        let expected = [
            (Category::Comparison, config.comparison_count),
            (Category::Illusion, config.illusion_count),
        ];
        for (category, count) in expected {
            let actual = catalog.count_in(category);
            if u32::try_from(actual).ok() != Some(count) {
                findings.fail(format!(
                    "seed {}: {category} has {actual} stages, expected {count}",
                    seed.seed
                ));
            }
        }
        let listed = catalog.categories();
        for category in Category::ALL {
            if !listed.iter().any(|summary| summary.category == category) {
                findings.fail(format!("seed {}: {category} missing from menu", seed.seed));
            }
        }
    }
}

fn check_determinism(ctx: &CheckContext<'_>, findings: &mut Findings) {
    for &seed in ctx.seeds {
        let (Some(first), Some(second)) = (build_for(seed, findings), build_for(seed, findings))
        else {
            continue;
        };
        if first.stages() != second.stages() {
            findings.fail(format!("seed {}: rebuilt catalog differs", seed.seed));
        }
        if first.fingerprint() != second.fingerprint() {
            findings.fail(format!(
                "seed {}: fingerprint {:016x} != {:016x}",
                seed.seed,
                first.fingerprint(),
                second.fingerprint()
            ));
        }

        // Regenerating one stage in isolation must reproduce it.
        let config = first.config();
        let comparisons = first.stages_in(Category::Comparison);
        for ordinal in [1, (config.comparison_count / 2).max(1), config.comparison_count] {
            let index = usize::try_from(ordinal.saturating_sub(1)).unwrap_or(0);
            let isolated =
                comparison::generate_stage(config.comparison_seed, ordinal, config.comparison_count);
            if comparisons.get(index).copied() != Some(&isolated) {
                findings.fail(format!(
                    "seed {}: comparison #{ordinal} depends on generation order",
                    seed.seed
                ));
            }
        }
        let illusions = first.stages_in(Category::Illusion);
        for ordinal in [1, (config.illusion_count / 2).max(1), config.illusion_count] {
            let index = usize::try_from(ordinal.saturating_sub(1)).unwrap_or(0);
            let isolated =
                illusion::generate_stage(config.illusion_seed, ordinal, config.illusion_count);
            if illusions.get(index).copied() != Some(&isolated) {
                findings.fail(format!(
                    "seed {}: illusion #{ordinal} depends on generation order",
                    seed.seed
                ));
            }
        }
    }
}

fn relative_gap(stage: &Stage) -> Option<f64> {
    let truth = stage.choice_truth()?;
    let smaller = truth.magnitude_a.min(truth.magnitude_b);
    Some((truth.magnitude_a - truth.magnitude_b).abs() / smaller)
}

fn illusion_strength_of(stage: &Stage) -> Option<f64> {
    match &stage.choice_truth()?.payload {
        ChoicePayload::Illusion(figure) => Some(figure.illusion_strength),
        ChoicePayload::Comparison(_) => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn check_tier_order(seed: SeedInfo, category: Category, stages: &[&Stage], findings: &mut Findings) {
    let total = u32::try_from(stages.len()).unwrap_or(u32::MAX);
    for (index, stage) in stages.iter().enumerate() {
        let ordinal = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let expected = tier_for(ordinal, total);
        if stage.difficulty != expected {
            findings.fail(format!(
                "seed {}: {} is {} but ordinal {ordinal}/{total} belongs to {expected}",
                seed.seed, stage.id, stage.difficulty
            ));
        }
    }
    if stages.windows(2).any(|w| w[1].difficulty < w[0].difficulty) {
        findings.fail(format!("seed {}: {category} tiers regress", seed.seed));
    }
}

fn check_monotonic_difficulty(ctx: &CheckContext<'_>, findings: &mut Findings) {
    for &seed in ctx.seeds {
        let Some(catalog) = build_for(seed, findings) else {
            continue;
        };

        let comparisons = catalog.stages_in(Category::Comparison);
        check_tier_order(seed, Category::Comparison, &comparisons, findings);
        let gaps_in = |tier: Difficulty| -> Vec<f64> {
            comparisons
                .iter()
                .filter(|stage| stage.difficulty == tier)
                .filter_map(|stage| relative_gap(stage))
                .collect()
        };
        let easy = mean(&gaps_in(Difficulty::Easy));
        let expert = mean(&gaps_in(Difficulty::Expert));
        if !comparisons.is_empty() && expert >= easy {
            findings.fail(format!(
                "seed {}: expert gap {expert:.3} is not tighter than easy gap {easy:.3}",
                seed.seed
            ));
        }

        let illusions = catalog.stages_in(Category::Illusion);
        check_tier_order(seed, Category::Illusion, &illusions, findings);
        let strengths: Vec<f64> = illusions
            .iter()
            .filter_map(|stage| illusion_strength_of(stage))
            .collect();
        if strengths.windows(2).any(|w| w[1] + 1e-12 < w[0]) {
            findings.fail(format!("seed {}: illusion strength eases", seed.seed));
        }
    }

    // Tightest comparison still sits inside the easiest tier's band.
    let total = CatalogConfig::default_stage_count();
    let (_, easy_max) = gap_band(tier_for(1, total));
    if gap_fraction(total, total) > easy_max || gap_fraction(total, total) >= gap_fraction(1, total) {
        findings.fail("final comparison gap is not tighter than the first");
    }
}

fn check_illusion_bias(ctx: &CheckContext<'_>, findings: &mut Findings) {
    for &seed in ctx.seeds {
        let Some(catalog) = build_for(seed, findings) else {
            continue;
        };
        for stage in catalog.stages_in(Category::Illusion) {
            let Some(truth) = stage.choice_truth() else {
                findings.fail(format!("seed {}: {} has no choice truth", seed.seed, stage.id));
                continue;
            };
            if let ChoicePayload::Illusion(figure) = &truth.payload
                && truth.correct_choice != Choice::Same
                && figure.illusion_favors.as_choice() == truth.correct_choice
            {
                findings.fail(format!(
                    "seed {}: {} favors the correct side {}",
                    seed.seed, stage.id, truth.correct_choice
                ));
            }
        }
        for stage in catalog.stages_in(Category::Comparison) {
            let Some(truth) = stage.choice_truth() else {
                continue;
            };
            let closer = if truth.magnitude_a <= truth.magnitude_b {
                Choice::A
            } else {
                Choice::B
            };
            if truth.correct_choice != closer {
                findings.fail(format!(
                    "seed {}: {} marks {} but {closer} is closer",
                    seed.seed, stage.id, truth.correct_choice
                ));
            }
        }
    }
}

fn check_family_balance(ctx: &CheckContext<'_>, findings: &mut Findings) {
    let mut favors: BTreeMap<IllusionFamily, (usize, usize)> = BTreeMap::new();
    for &seed in ctx.seeds {
        let Some(catalog) = build_for(seed, findings) else {
            continue;
        };
        let mut counts: BTreeMap<IllusionFamily, usize> = BTreeMap::new();
        for stage in catalog.stages_in(Category::Illusion) {
            let Some(ChoicePayload::Illusion(figure)) =
                stage.choice_truth().map(|truth| &truth.payload)
            else {
                continue;
            };
            *counts.entry(figure.family).or_default() += 1;
            let entry = favors.entry(figure.family).or_default();
            entry.1 += 1;
            if figure.illusion_favors == Side::A {
                entry.0 += 1;
            }
        }
        let used = counts.len();
        let max = counts.values().copied().max().unwrap_or(0);
        let min = if used < IllusionFamily::ALL.len() {
            0
        } else {
            counts.values().copied().min().unwrap_or(0)
        };
        if max - min > 1 {
            findings.fail(format!(
                "seed {}: family counts range {min}..={max}",
                seed.seed
            ));
        }
    }

    for (family, (favor_a, total)) in favors {
        if total < MIN_BALANCE_SAMPLE {
            if ctx.verbose {
                println!("  ℹ️  {family}: {total} samples, side balance not judged");
            }
            continue;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = favor_a as f64 / total as f64;
        if (ratio - 0.5).abs() > BALANCE_TOLERANCE {
            findings.fail(format!("{family} favors side A in {ratio:.3} of {total} stages"));
        }
    }
}

fn numeric_truth(distance_m: f64) -> DistanceTruth {
    DistanceTruth {
        question: "How far away is the marker?".to_string(),
        correct_distance_m: distance_m,
        correct_height_m: None,
        subject: None,
        hint: None,
        image: None,
        target: TargetPosition::default(),
    }
}

fn check_scoring_scenarios(_ctx: &CheckContext<'_>, findings: &mut Findings) {
    let scoring = ScoringConfig::default();

    let exact = score_distance(&scoring, "exact", &numeric_truth(300.0), 300.0, 0.0, false);
    if exact.score != 100 || exact.tier != ResultTier::GodsEye {
        findings.fail(format!("exact guess scored {} ({})", exact.score, exact.tier));
    }

    let off = score_distance(&scoring, "off", &numeric_truth(100.0), 150.0, 0.0, false);
    let expected = score_from_error(&scoring, 50.0);
    if off.score != expected {
        findings.fail(format!("50% error scored {}, expected {expected}", off.score));
    }
    if off != score_distance(&scoring, "off", &numeric_truth(100.0), 150.0, 0.0, false) {
        findings.fail("scoring the same guess twice differed");
    }

    let catalog = StageCatalog::standard();
    match catalog
        .stages_in(Category::Comparison)
        .into_iter()
        .find_map(|stage| stage.choice_truth().map(|truth| (stage, truth)))
    {
        Some((stage, truth)) => {
            let right = score_choice(&stage.id, truth, truth.correct_choice).score;
            let wrong_choice = if truth.correct_choice == Choice::A {
                Choice::B
            } else {
                Choice::A
            };
            let wrong = score_choice(&stage.id, truth, wrong_choice).score;
            if (right, wrong) != (100, 0) {
                findings.fail(format!("choice scored {right}/{wrong}, expected 100/0"));
            }
        }
        None => findings.fail("no comparison stage to score"),
    }

    let mut store = ProgressStore::new();
    store.record("x", 40);
    if store.record("x", 40) != RecordOutcome::Unchanged || store.total_score() != 80 {
        findings.fail(format!(
            "repeated 40 recorded total {} with best {:?}",
            store.total_score(),
            store.best_for("x")
        ));
    }
    store.record("y", 80);
    store.record("y", 60);
    if store.best_for("y") != Some(80) {
        findings.fail(format!("best for y fell to {:?}", store.best_for("y")));
    }

    match simulated_engine(QuizConfig::default()) {
        Ok(mut engine) => {
            engine.select_category(Category::Landmark);
            let outcome = engine.previous_stage();
            if outcome != TransitionOutcome::Unchanged || engine.session().position() != 0 {
                findings.fail(format!("previous at first stage gave {outcome:?}"));
            }
        }
        Err(err) => findings.fail(format!("engine failed to load: {err:#}")),
    }
}

fn check_session_walkthrough(ctx: &CheckContext<'_>, findings: &mut Findings) {
    for &seed in ctx.seeds {
        let config = QuizConfig {
            catalog: CheckContext::catalog_config(seed),
            ..QuizConfig::default()
        };
        let mut engine = match simulated_engine(config) {
            Ok(engine) => engine,
            Err(err) => {
                findings.fail(format!("seed {}: engine failed to load: {err:#}", seed.seed));
                continue;
            }
        };

        for play in 0..ctx.plays {
            for strategy in PlayStrategy::ALL {
                let play_seed = seed.seed.wrapping_add(u64::try_from(play).unwrap_or(u64::MAX));
                for category in Category::ALL {
                    let mut policy = strategy.create_policy(play_seed);
                    match play_category(&mut engine, category, strategy, policy.as_mut()) {
                        Ok(summary) => {
                            if let Some(problem) = judge_play(strategy, &summary) {
                                findings.fail(format!(
                                    "seed {} play {}: {strategy} on {category}: {problem}",
                                    seed.seed,
                                    play + 1
                                ));
                            }
                            findings.plays.push(summary);
                        }
                        Err(err) => findings.fail(format!(
                            "seed {} play {}: {strategy} on {category}: {err:#}",
                            seed.seed,
                            play + 1
                        )),
                    }
                }
                engine.reset_session();
            }
        }
    }
}

/// Expectations each strategy must meet on a category run.
fn judge_play(strategy: PlayStrategy, summary: &PlaySummary) -> Option<String> {
    match strategy {
        PlayStrategy::Perfect if summary.perfect_stages != summary.stages_played => Some(format!(
            "only {}/{} stages were perfect",
            summary.perfect_stages, summary.stages_played
        )),
        PlayStrategy::Fooled
            if matches!(summary.category, Category::Comparison | Category::Illusion)
                && summary.total_score != 0 =>
        {
            Some(format!("scored {} while always fooled", summary.total_score))
        }
        PlayStrategy::Fooled if summary.perfect_stages != 0 => {
            Some("doubled guesses reached a perfect score".to_string())
        }
        _ if summary.category == Category::Skytree
            && summary.height_known_stages + 1 < summary.stages_played =>
        {
            Some(format!(
                "height known on {} of {} stages",
                summary.height_known_stages, summary.stages_played
            ))
        }
        _ => None,
    }
}

mod duration_serde {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(key: &str, seeds: &[SeedInfo]) -> CheckResult {
        let ctx = CheckContext {
            seeds,
            plays: 1,
            verbose: false,
        };
        run_check(get_check(key).unwrap(), &ctx)
    }

    #[test]
    fn every_check_passes_for_default_seed() {
        let seeds = [SeedInfo::from_numeric(1337)];
        for (key, _) in list_checks() {
            let result = run(key, &seeds);
            assert!(result.passed, "{key}: {:?}", result.failures);
        }
    }

    #[test]
    fn walkthrough_records_one_summary_per_strategy_and_category() {
        let result = run("session-walkthrough", &[SeedInfo::from_numeric(9)]);
        assert_eq!(
            result.plays.len(),
            PlayStrategy::ALL.len() * Category::ALL.len()
        );
    }

    #[test]
    fn unknown_keys_are_not_found() {
        assert!(get_check("weather-effects").is_none());
        assert_eq!(list_checks().count(), CHECKS.len());
    }

    #[test]
    fn judge_flags_imperfect_perfect_runs() {
        let summary = PlaySummary {
            category: Category::Landmark,
            strategy: "Perfect".to_string(),
            stages_played: 18,
            total_score: 1700,
            perfect_stages: 17,
            zero_stages: 0,
            height_known_stages: 0,
        };
        assert!(judge_play(PlayStrategy::Perfect, &summary).is_some());
        assert!(judge_play(PlayStrategy::Noisy, &summary).is_none());
    }
}
