//! Centralized balance and tuning constants for Farsight quiz logic.
//!
//! Generator constants are part of the generated content: changing any of
//! them changes every procedural stage, so they only move through reviewed
//! code changes rather than external data.

// Sequence generator -------------------------------------------------------
pub(crate) const PARK_MILLER_MULTIPLIER: u64 = 16_807;
pub(crate) const PARK_MILLER_MODULUS: u64 = 2_147_483_647;
pub(crate) const XORSHIFT_ZERO_REMAP: u32 = 0x9E37_79B9;
pub(crate) const COMPARISON_DOMAIN_TAG: &[u8] = b"farsight/comparison";
pub(crate) const ILLUSION_DOMAIN_TAG: &[u8] = b"farsight/illusion";

// Catalog defaults -----------------------------------------------------------
pub const DEFAULT_COMPARISON_SEED: u64 = 0x00C0_FFEE;
pub const DEFAULT_ILLUSION_SEED: u64 = 0x0B5E_55ED;
pub const DEFAULT_PROCEDURAL_STAGE_COUNT: u32 = 50;

// Paired comparison generation ---------------------------------------------
pub(crate) const COMPARISON_BASE_MIN_M: f64 = 60.0;
pub(crate) const COMPARISON_BASE_MAX_M: f64 = 300.0;
pub(crate) const COMPARISON_MIN_OFFSET_M: f64 = 1.0;
pub(crate) const COMPARISON_FLOOR_M: f64 = 5.0;

// Size-illusion generation -------------------------------------------------
pub(crate) const ILLUSION_BASE_MIN: f64 = 80.0;
pub(crate) const ILLUSION_BASE_MAX: f64 = 200.0;
pub(crate) const ILLUSION_MIN_OFFSET: f64 = 1.0;
pub(crate) const ILLUSION_FLOOR: f64 = 1.0;

// Difficulty bands (easy, normal, hard, expert) ----------------------------
pub(crate) const GAP_FRACTION_BANDS: [(f64, f64); 4] =
    [(0.30, 0.50), (0.15, 0.30), (0.07, 0.15), (0.02, 0.07)];
pub(crate) const ILLUSION_STRENGTH_BANDS: [(f64, f64); 4] =
    [(0.20, 0.40), (0.40, 0.60), (0.60, 0.80), (0.80, 1.00)];
pub(crate) const ILLUSION_DIFF_PCT_BANDS: [(f64, f64); 4] =
    [(0.15, 0.25), (0.08, 0.15), (0.04, 0.08), (0.01, 0.05)];
pub(crate) const ILLUSION_SAME_PROBABILITY: [f64; 4] = [0.15, 0.20, 0.25, 0.30];

// Scoring ------------------------------------------------------------------
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.8;
pub const DEFAULT_TIER_THRESHOLDS: [f64; 5] = [10.0, 25.0, 40.0, 60.0, 80.0];
pub(crate) const CHOICE_FULL_SCORE: u8 = 100;

// Session defaults ---------------------------------------------------------
pub(crate) const DEFAULT_DISTANCE_GUESS_M: f64 = 50.0;
pub(crate) const DEFAULT_HEIGHT_GUESS_M: f64 = 10.0;

// Player profile -----------------------------------------------------------
pub(crate) const PLAYER_NAME_MAX_CHARS: usize = 12;

// Collection badges --------------------------------------------------------
pub(crate) const BADGE_GOLD_MIN: u8 = 92;
pub(crate) const BADGE_BLUE_MIN: u8 = 80;
pub(crate) const BADGE_GREEN_MIN: u8 = 60;
pub(crate) const BADGE_ORANGE_MIN: u8 = 40;

// Geography ----------------------------------------------------------------
pub(crate) const EARTH_RADIUS_M: f64 = 6_371_000.0;
