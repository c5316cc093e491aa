//! # RandomNumberGenerator
//!
//! A single seedable random source that is threaded through every operator of a run:
//! population initialization, crossover, repair and mutation all draw from the same
//! instance, so a fixed seed reproduces a run end to end.
//!
//! Operators accept `&mut dyn RngCore`, which lets tests substitute a deterministic
//! source such as `rand::rngs::mock::StepRng`.
//!
//! ## Example
//!
//! ```rust
//! use evotune::rng::RandomNumberGenerator;
//! use rand::Rng;
//!
//! let mut a = RandomNumberGenerator::from_seed(7);
//! let mut b = RandomNumberGenerator::from_seed(7);
//!
//! assert_eq!(a.gen_range(0..100), b.gen_range(0..100));
//! ```

use rand::{rngs::StdRng, RngCore, SeedableRng};

/// A wrapper around the `rand` crate's `StdRng`.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    ///
    /// Runs built this way are not reproducible; use [`from_seed`](Self::from_seed)
    /// whenever a run has to be replayed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a generator from an optional seed, falling back to entropy.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::new(),
        }
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for RandomNumberGenerator {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
