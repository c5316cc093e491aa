use rand::{Rng, RngCore};
use tracing::debug;

use super::{finish_offspring, parent_bits, Crossover};
use crate::{
    error::{OptimizerError, Result},
    representation::Representation,
};

/// Commonality-based crossover for two bit string parents (Smith and Jacobs).
///
/// Bits set in both parents are kept. For the `n_u` positions where exactly one
/// parent has a set bit, the first parent's bit is taken with probability
/// `p = (n_1 - n_c) / n_u`, so the expected number of set bits stays close to the
/// parents'. Identical parents (`n_u == 0`) produce copies of the first parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonalityBasedBitstringCrossover {
    offspring_count: usize,
}

impl CommonalityBasedBitstringCrossover {
    /// Creates a new commonality-based crossover producing `offspring_count`
    /// offspring from two parents.
    ///
    /// # Errors
    ///
    /// A `Configuration` error if `offspring_count` is zero.
    pub fn new(offspring_count: usize) -> Result<Self> {
        if offspring_count == 0 {
            return Err(OptimizerError::Configuration(
                "CommonalityBasedBitstringCrossover needs a positive offspring count".to_string(),
            ));
        }
        Ok(Self { offspring_count })
    }
}

impl Default for CommonalityBasedBitstringCrossover {
    fn default() -> Self {
        Self { offspring_count: 1 }
    }
}

/// Counts `(n_c, n_u, n_1)` for two equally long bit strings.
fn commonality(first: &[bool], second: &[bool]) -> (usize, usize, usize) {
    first
        .iter()
        .zip(second)
        .fold((0, 0, 0), |(common, uncommon, ones), (&a, &b)| {
            (
                common + usize::from(a && b),
                uncommon + usize::from(a != b),
                ones + usize::from(a),
            )
        })
}

impl Crossover for CommonalityBasedBitstringCrossover {
    fn name(&self) -> &'static str {
        "CommonalityBasedBitstringCrossover"
    }

    fn parent_count(&self) -> usize {
        2
    }

    fn offspring_count(&self) -> usize {
        self.offspring_count
    }

    fn crossover(
        &self,
        parents: &[&Representation],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Representation>> {
        let bits = parent_bits(2, parents)?;
        let (first, second) = (bits[0], bits[1]);
        let (common, uncommon, ones) = commonality(first, second);
        debug!(
            operator = self.name(),
            first = %parents[0],
            second = %parents[1],
            common,
            uncommon,
            "Crossover parents"
        );

        let mut offspring = Vec::with_capacity(self.offspring_count);
        for _ in 0..self.offspring_count {
            let child: Vec<bool> = if uncommon == 0 {
                first.to_vec()
            } else {
                let p = (ones - common) as f64 / uncommon as f64;
                first
                    .iter()
                    .zip(second)
                    .map(|(&a, &b)| if rng.gen::<f64>() < p { a } else { b })
                    .collect()
            };
            let child = finish_offspring(self.name(), parents[0], child, rng)?;
            debug!(operator = self.name(), bits = %child, "Crossover offspring");
            offspring.push(child);
        }
        Ok(offspring)
    }
}
