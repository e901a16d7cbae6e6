//! Deterministic sequence generators used to build the procedural catalogs.
//!
//! Every procedural stage owns a fresh stream seeded from
//! [`derive_stage_seed`], so the content of one stage never depends on how many
//! draws another stage (or another catalog) consumed.
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::{PARK_MILLER_MODULUS, PARK_MILLER_MULTIPLIER, XORSHIFT_ZERO_REMAP};
use crate::numbers::unit_to_u32;

/// Seeded, reproducible stream of values in `[0, 1)`.
pub trait SequenceGenerator {
    /// Draw the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Number of draws performed against this stream.
    fn draws(&self) -> u64;

    /// Draw uniformly in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_unit()
    }

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Fair coin flip.
    fn coin(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Draw a 32-bit seed for a downstream consumer (e.g. scene layout).
    fn next_seed(&mut self) -> u32 {
        unit_to_u32(self.next_unit())
    }
}

/// Park–Miller "minimal standard" Lehmer generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkMillerStream {
    seed: u64,
    state: u64,
    draws: u64,
}

impl ParkMillerStream {
    /// Construct a stream; seeds congruent to zero are remapped to 1.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        let mut state = seed % PARK_MILLER_MODULUS;
        if state == 0 {
            state = 1;
        }
        Self {
            seed,
            state,
            draws: 0,
        }
    }

    /// Seed this stream was constructed with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Raw Lehmer state, always in `1..MODULUS`.
    #[must_use]
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Fresh stream positioned at the first draw of the same seed.
    #[must_use]
    pub const fn restarted(&self) -> Self {
        Self::new(self.seed)
    }

    /// The `n`th (0-based) draw of `seed`.
    #[must_use]
    pub fn value_at(seed: u64, n: u64) -> f64 {
        let mut stream = Self::new(seed);
        for _ in 0..n {
            stream.step();
        }
        stream.next_unit()
    }

    fn step(&mut self) -> u64 {
        self.state = (self.state * PARK_MILLER_MULTIPLIER) % PARK_MILLER_MODULUS;
        self.draws = self.draws.saturating_add(1);
        self.state
    }
}

impl SequenceGenerator for ParkMillerStream {
    fn next_unit(&mut self) -> f64 {
        let state = self.step();
        // state is in 1..MODULUS, so this never reaches 1.0
        (state - 1) as f64 / (PARK_MILLER_MODULUS - 1) as f64
    }

    fn draws(&self) -> u64 {
        self.draws
    }
}

impl Iterator for ParkMillerStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_unit())
    }
}

/// Marsaglia xorshift32 generator (13/17/5 triple).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShiftStream {
    seed: u64,
    state: u32,
    draws: u64,
}

impl XorShiftStream {
    /// Construct a stream; the 64-bit seed is folded to 32 bits and a zero
    /// state is remapped because xorshift stalls at zero.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        let mut state = ((seed ^ (seed >> 32)) & 0xFFFF_FFFF) as u32;
        if state == 0 {
            state = XORSHIFT_ZERO_REMAP;
        }
        Self {
            seed,
            state,
            draws: 0,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }

    #[must_use]
    pub const fn restarted(&self) -> Self {
        Self::new(self.seed)
    }

    /// The `n`th (0-based) draw of `seed`.
    #[must_use]
    pub fn value_at(seed: u64, n: u64) -> f64 {
        let mut stream = Self::new(seed);
        for _ in 0..n {
            stream.step();
        }
        stream.next_unit()
    }

    fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.draws = self.draws.saturating_add(1);
        x
    }
}

impl SequenceGenerator for XorShiftStream {
    fn next_unit(&mut self) -> f64 {
        f64::from(self.step()) / 4_294_967_296.0
    }

    fn draws(&self) -> u64 {
        self.draws
    }
}

impl Iterator for XorShiftStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_unit())
    }
}

/// Derive the seed for one procedural stage from its catalog seed.
///
/// HMAC-SHA256 keyed by the catalog seed over the domain tag and the 1-based
/// ordinal; distinct domains never share stage seeds.
#[must_use]
pub fn derive_stage_seed(domain_tag: &[u8], catalog_seed: u64, ordinal: u32) -> u64 {
    // HMAC accepts keys of any length.
    let mut mac = Hmac::<Sha256>::new_from_slice(&catalog_seed.to_le_bytes())
        .unwrap_or_else(|_| Hmac::<Sha256>::new(&Default::default()));
    mac.update(domain_tag);
    mac.update(&ordinal.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COMPARISON_DOMAIN_TAG, ILLUSION_DOMAIN_TAG};

    #[test]
    fn park_miller_matches_minimal_standard_check_value() {
        let mut stream = ParkMillerStream::new(1);
        for _ in 0..10_000 {
            let _ = stream.next_unit();
        }
        assert_eq!(stream.state(), 1_043_618_065);
        assert_eq!(stream.draws(), 10_000);
    }

    #[test]
    fn park_miller_remaps_zero_seed() {
        let zero = ParkMillerStream::new(0);
        assert_eq!(zero.state(), 1);
        let congruent = ParkMillerStream::new(PARK_MILLER_MODULUS * 3);
        assert_eq!(congruent.state(), 1);
        let mut stream = ParkMillerStream::new(0);
        let first = stream.next_unit();
        assert!((first - 16_806.0 / 2_147_483_646.0).abs() < 1e-15);
    }

    #[test]
    fn xorshift_first_draw_matches_reference() {
        let mut stream = XorShiftStream::new(1);
        let _ = stream.next_unit();
        assert_eq!(stream.state(), 270_369);
    }

    #[test]
    fn xorshift_never_stalls_on_zero_seed() {
        let mut stream = XorShiftStream::new(0);
        assert_eq!(stream.state(), XORSHIFT_ZERO_REMAP);
        let draws: Vec<f64> = stream.by_ref().take(32).collect();
        assert!(draws.iter().any(|value| *value > 0.0));
        assert_ne!(stream.state(), 0);
        // A seed whose halves cancel folds to zero as well.
        let folded = XorShiftStream::new(0xABCD_1234_ABCD_1234);
        assert_eq!(folded.state(), XORSHIFT_ZERO_REMAP);
    }

    #[test]
    fn streams_stay_in_unit_interval_and_restart() {
        let mut lcg = ParkMillerStream::new(0xDEAD_BEEF);
        let mut xs = XorShiftStream::new(0xDEAD_BEEF);
        let lcg_values: Vec<f64> = lcg.by_ref().take(2_000).collect();
        let xs_values: Vec<f64> = xs.by_ref().take(2_000).collect();
        assert!(lcg_values.iter().all(|v| (0.0..1.0).contains(v)));
        assert!(xs_values.iter().all(|v| (0.0..1.0).contains(v)));

        let replay: Vec<f64> = lcg.restarted().take(2_000).collect();
        assert_eq!(lcg_values, replay);
        let replay: Vec<f64> = xs.restarted().take(2_000).collect();
        assert_eq!(xs_values, replay);
    }

    #[test]
    fn value_at_is_pure_in_seed_and_index() {
        let mut stream = XorShiftStream::new(77);
        let seventh = stream.by_ref().nth(7).unwrap();
        assert!((XorShiftStream::value_at(77, 7) - seventh).abs() < f64::EPSILON);

        let mut stream = ParkMillerStream::new(77);
        let third = stream.by_ref().nth(3).unwrap();
        assert!((ParkMillerStream::value_at(77, 3) - third).abs() < f64::EPSILON);
    }

    #[test]
    fn helpers_consume_one_draw_each() {
        let mut stream = XorShiftStream::new(5);
        let value = stream.range(10.0, 20.0);
        assert!((10.0..20.0).contains(&value));
        let _ = stream.coin();
        let _ = stream.chance(0.25);
        let _ = stream.next_seed();
        assert_eq!(stream.draws(), 4);
    }

    #[test]
    fn stage_seeds_are_domain_separated() {
        let seed = 0xFEED_CAFE_u64;
        assert_eq!(
            derive_stage_seed(COMPARISON_DOMAIN_TAG, seed, 1),
            derive_stage_seed(COMPARISON_DOMAIN_TAG, seed, 1)
        );
        assert_ne!(
            derive_stage_seed(COMPARISON_DOMAIN_TAG, seed, 1),
            derive_stage_seed(ILLUSION_DOMAIN_TAG, seed, 1),
            "domain tags must derive distinct seeds"
        );
        assert_ne!(
            derive_stage_seed(COMPARISON_DOMAIN_TAG, seed, 1),
            derive_stage_seed(COMPARISON_DOMAIN_TAG, seed, 2)
        );
    }
}
