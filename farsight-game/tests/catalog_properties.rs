use std::collections::BTreeMap;

use farsight_game::difficulty::{gap_band, tier_for};
use farsight_game::{
    CatalogConfig, Category, Choice, ChoicePayload, Difficulty, IllusionFamily, Side, Stage,
    StageCatalog, comparison, fingerprint_stages, gap_fraction, illusion,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const SEED_SAMPLE: usize = 200;
const BALANCE_TOLERANCE: f64 = 0.06;

fn seeds(n: usize) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(0x5EED_F00D);
    (0..n).map(|_| rng.r#gen::<u64>()).collect()
}

fn strength(stage: &Stage) -> f64 {
    match &stage.choice_truth().unwrap().payload {
        ChoicePayload::Illusion(figure) => figure.illusion_strength,
        ChoicePayload::Comparison(_) => panic!("comparison payload in illusion catalog"),
    }
}

fn relative_gap(stage: &Stage) -> f64 {
    let truth = stage.choice_truth().unwrap();
    (truth.magnitude_a - truth.magnitude_b).abs() / truth.magnitude_a
}

#[test]
fn catalogs_are_deterministic_per_seed() {
    for seed in seeds(8) {
        let config = CatalogConfig::with_seeds(seed, seed.rotate_left(17));
        let first = StageCatalog::build(&config).unwrap();
        let second = StageCatalog::build(&config).unwrap();
        assert_eq!(first.stages(), second.stages());
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(
            serde_json::to_vec(first.stages()).unwrap(),
            serde_json::to_vec(second.stages()).unwrap()
        );
    }
}

#[test]
fn stage_content_ignores_generation_order() {
    let forward = comparison::generate(42, 50);
    let mut backward: Vec<Stage> = (1..=50)
        .rev()
        .map(|n| comparison::generate_stage(42, n, 50))
        .collect();
    backward.reverse();
    assert_eq!(fingerprint_stages(&forward), fingerprint_stages(&backward));

    let illusions = illusion::generate(42, 50);
    assert_eq!(illusions[30], illusion::generate_stage(42, 31, 50));
}

#[test]
fn difficulty_never_eases_along_the_catalog() {
    let catalog = StageCatalog::standard();
    for category in [Category::Comparison, Category::Illusion] {
        let stages = catalog.stages_in(category);
        assert!(
            stages.windows(2).all(|w| w[0].difficulty <= w[1].difficulty),
            "{category} tiers regress"
        );
        assert_eq!(stages.first().map(|s| s.difficulty), Some(Difficulty::Easy));
        assert_eq!(stages.last().map(|s| s.difficulty), Some(Difficulty::Expert));
    }

    let illusions = catalog.stages_in(Category::Illusion);
    for pair in illusions.windows(2) {
        assert!(strength(pair[1]) + 1e-12 >= strength(pair[0]));
    }

    // Rounding to whole meters keeps realized gaps near the target fraction.
    let comparisons = catalog.stages_in(Category::Comparison);
    let early: f64 = comparisons[..13].iter().map(|s| relative_gap(s)).sum::<f64>() / 13.0;
    let late: f64 = comparisons[38..].iter().map(|s| relative_gap(s)).sum::<f64>() / 12.0;
    assert!(late < early, "late gap {late} not tighter than early {early}");
    for stage in &comparisons[38..] {
        assert!(relative_gap(stage) <= 0.08, "{} gap too wide", stage.id);
    }
}

#[test]
fn hardest_gap_fits_inside_easiest_band() {
    let (_, easy_max) = gap_band(tier_for(1, 50));
    assert!(gap_fraction(50, 50) <= easy_max);
    assert!(gap_fraction(50, 50) < gap_fraction(1, 50));
}

#[test]
fn illusion_favors_wrong_side_on_every_unequal_stage() {
    for seed in seeds(SEED_SAMPLE) {
        for stage in illusion::generate(seed, 50) {
            let truth = stage.choice_truth().unwrap();
            let ChoicePayload::Illusion(figure) = &truth.payload else {
                panic!("illusion stage without figure");
            };
            if truth.correct_choice != Choice::Same {
                assert_ne!(figure.illusion_favors.as_choice(), truth.correct_choice);
            }
        }
    }
}

#[test]
fn favored_side_is_balanced_per_family() {
    let mut favors_a: BTreeMap<IllusionFamily, (usize, usize)> = BTreeMap::new();
    let mut same = 0usize;
    let mut total = 0usize;
    for seed in seeds(SEED_SAMPLE) {
        for stage in illusion::generate(seed, 50) {
            let truth = stage.choice_truth().unwrap();
            let ChoicePayload::Illusion(figure) = &truth.payload else {
                panic!("illusion stage without figure");
            };
            let entry = favors_a.entry(figure.family).or_default();
            entry.1 += 1;
            if figure.illusion_favors == Side::A {
                entry.0 += 1;
            }
            total += 1;
            if truth.correct_choice == Choice::Same {
                same += 1;
            }
        }
    }
    for (family, (a, n)) in favors_a {
        let ratio = a as f64 / n as f64;
        assert!(
            (ratio - 0.5).abs() < BALANCE_TOLERANCE,
            "{family} favors A in {ratio:.3} of stages"
        );
    }
    let same_ratio = same as f64 / total as f64;
    assert!(
        (0.15..0.30).contains(&same_ratio),
        "equal stages made up {same_ratio:.3} of the catalog"
    );
}

#[test]
fn standard_catalog_is_valid_and_shared() {
    let catalog = StageCatalog::standard();
    catalog.validate().unwrap();
    assert_eq!(catalog.count_in(Category::Comparison), 50);
    assert_eq!(catalog.count_in(Category::Illusion), 50);
    assert!(
        catalog
            .stages()
            .iter()
            .all(|stage| !stage.id.is_empty() && !stage.question().is_empty())
    );
}
