use rand::Rng;

/// Inclusive multiplicative factor range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterRange {
    pub min: f64,
    pub max: f64,
}

impl JitterRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Draws a factor; a degenerate range always yields `min`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max - self.min <= f64::EPSILON {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// Randomization applied to repeated generations
///
/// All randomness flows from the generator passed in by the caller, so a
/// seeded generator reproduces a run exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JitterConfig {
    /// Factor applied to genre weights when ranking genres for seeding
    pub genre_weight: Option<JitterRange>,
    /// Extra seeds per genre drawn from `0..=spread`
    pub seeds_per_genre_spread: usize,
    /// Factor applied to each candidate's genre-match score
    pub genre_match: Option<JitterRange>,
}

impl JitterConfig {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.genre_weight.is_some() || self.seeds_per_genre_spread > 0 || self.genre_match.is_some()
    }

    pub fn genre_weight_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.genre_weight.map_or(1.0, |r| r.sample(rng))
    }

    pub fn genre_match_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.genre_match.map_or(1.0, |r| r.sample(rng))
    }

    pub fn seeds_per_genre<R: Rng + ?Sized>(&self, base: usize, rng: &mut R) -> usize {
        if self.seeds_per_genre_spread == 0 {
            base
        } else {
            base + rng.gen_range(0..=self.seeds_per_genre_spread)
        }
    }
}
