//! # Mutation
//!
//! Mutation operators for single genes. Each operator keeps its own step size or
//! probability factor and adapts it from the success counts reported by selection
//! through [`Mutation::record_generation`].

pub mod bit_flip;
pub mod integer;

pub use bit_flip::{AsymmetricBitFlip, RandomBitFlip, SelfAdaptation};
pub use integer::{IntegerMutation, StepSizeAdaptation};

use std::fmt::Debug;

use rand::RngCore;
use tracing::debug;

use crate::{
    error::{OptimizerError, Result},
    individual::Individual,
    representation::Representation,
};

/// A mutation operator over a single gene.
pub trait Mutation: Debug + Send {
    /// The name under which the operator is reported.
    fn name(&self) -> &'static str;

    /// Mutates `gene` in place, keeping its shape.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the gene is not of the variant the operator handles.
    fn mutate(&mut self, gene: &mut Representation, rng: &mut dyn RngCore) -> Result<()>;

    /// Reports the success count of a finished generation.
    fn record_generation(&mut self, success_count: usize, offspring_size: usize);
}

/// Applies `mutation` to the gene called `gene_name` of `individual`.
pub fn mutate_gene(
    individual: &mut Individual,
    gene_name: &str,
    mutation: &mut dyn Mutation,
    rng: &mut dyn RngCore,
) -> Result<()> {
    let gene = individual
        .genome_mut()
        .iter_mut()
        .find(|gene| gene.name == gene_name)
        .ok_or_else(|| OptimizerError::ShapeMismatch(format!("genome has no gene '{}'", gene_name)))?;
    debug!(operator = mutation.name(), gene = gene_name, "Mutating gene");
    mutation.mutate(&mut gene.value, rng)
}

/// Success counts accumulated over a fixed number of generations.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SuccessWindow {
    interval: usize,
    generations: usize,
    successes: usize,
}

impl SuccessWindow {
    pub(crate) fn new(interval: usize) -> Self {
        Self {
            interval,
            generations: 0,
            successes: 0,
        }
    }

    /// Adds one generation; returns the success rate when the window is full.
    ///
    /// The rate is `successes / (interval * offspring_size)`; the window restarts afterwards.
    pub(crate) fn record(&mut self, success_count: usize, offspring_size: usize) -> Option<f64> {
        self.generations += 1;
        self.successes += success_count;
        if self.interval == 0 || self.generations % self.interval != 0 {
            return None;
        }
        let trials = (self.interval * offspring_size.max(1)) as f64;
        let rate = self.successes as f64 / trials;
        self.successes = 0;
        Some(rate)
    }

    /// Number of generations recorded so far.
    pub(crate) fn generation(&self) -> usize {
        self.generations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::Gene;
    use crate::rng::RandomNumberGenerator;

    #[test]
    fn test_success_window() {
        let mut window = SuccessWindow::new(3);
        assert_eq!(window.record(1, 2), None);
        assert_eq!(window.record(0, 2), None);
        assert_eq!(window.record(2, 2), Some(0.5));
        assert_eq!(window.record(0, 2), None);
        assert_eq!(window.generation(), 4);
    }

    #[test]
    fn test_mutate_gene_by_name() {
        let mut individual = Individual::new(vec![
            Gene::new("mask", Representation::BinaryVector(vec![true, false, true, false])),
            Gene::new(
                "window",
                Representation::IntegerScalar {
                    value: 5,
                    min: 0,
                    max: 10,
                },
            ),
        ]);
        let mut rng = RandomNumberGenerator::from_seed(8);
        let mut flip = RandomBitFlip::new(4.0).unwrap();

        mutate_gene(&mut individual, "mask", &mut flip, &mut rng).unwrap();
        assert_eq!(individual.gene("mask").map(|g| g.len()), Some(4));

        let err = mutate_gene(&mut individual, "window", &mut flip, &mut rng).unwrap_err();
        assert!(matches!(err, OptimizerError::ShapeMismatch(_)));

        let err = mutate_gene(&mut individual, "missing", &mut flip, &mut rng).unwrap_err();
        assert!(matches!(err, OptimizerError::ShapeMismatch(_)));
    }
}
