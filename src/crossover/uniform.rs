use rand::{Rng, RngCore};
use tracing::debug;

use super::{finish_offspring, parent_bits, Crossover};
use crate::{
    error::{OptimizerError, Result},
    representation::Representation,
};

/// Uniform crossover over `k` bit string parents.
///
/// Every bit of every offspring is copied from a parent drawn uniformly from the
/// `k` parents, independently of all other bits and offspring. Draws run position
/// by position, and within a position offspring by offspring; repair draws for
/// all-zero offspring follow once every bit is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBitstringCrossover {
    parent_count: usize,
    offspring_count: usize,
}

impl UniformBitstringCrossover {
    /// Creates a new uniform crossover.
    ///
    /// # Arguments
    ///
    /// * `parent_count` - The number of parents `k` per application.
    /// * `offspring_count` - The number of offspring `m` per application.
    ///
    /// # Errors
    ///
    /// A `Configuration` error if either count is zero.
    pub fn new(parent_count: usize, offspring_count: usize) -> Result<Self> {
        if parent_count == 0 || offspring_count == 0 {
            return Err(OptimizerError::Configuration(format!(
                "UniformBitstringCrossover needs a positive parent and offspring count, got {} and {}",
                parent_count, offspring_count
            )));
        }
        Ok(Self {
            parent_count,
            offspring_count,
        })
    }
}

impl Default for UniformBitstringCrossover {
    fn default() -> Self {
        Self {
            parent_count: 2,
            offspring_count: 1,
        }
    }
}

impl Crossover for UniformBitstringCrossover {
    fn name(&self) -> &'static str {
        "UniformBitstringCrossover"
    }

    fn parent_count(&self) -> usize {
        self.parent_count
    }

    fn offspring_count(&self) -> usize {
        self.offspring_count
    }

    fn crossover(
        &self,
        parents: &[&Representation],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Representation>> {
        let bits = parent_bits(self.parent_count, parents)?;
        let length = bits[0].len();
        for (index, parent) in parents.iter().enumerate() {
            debug!(operator = self.name(), parent = index, bits = %parent, "Crossover parent");
        }

        let mut children = vec![Vec::with_capacity(length); self.offspring_count];
        for position in 0..length {
            for child in children.iter_mut() {
                child.push(bits[rng.gen_range(0..self.parent_count)][position]);
            }
        }

        let mut offspring = Vec::with_capacity(self.offspring_count);
        for child in children {
            let child = finish_offspring(self.name(), parents[0], child, rng)?;
            debug!(operator = self.name(), bits = %child, "Crossover offspring");
            offspring.push(child);
        }
        Ok(offspring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;
    use proptest::prelude::*;
    use rand::rngs::mock::StepRng;

    fn bits(s: &str) -> Representation {
        Representation::parse_binary_vector(s)
    }

    #[test]
    fn test_always_first_parent() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let operator = UniformBitstringCrossover::new(2, 1).unwrap();
        let mut rng = StepRng::new(0, 0);

        let offspring = operator
            .crossover(&[&bits("1100"), &bits("1010")], &mut rng)
            .unwrap();
        assert_eq!(offspring, vec![bits("1100")]);
    }

    #[test]
    fn test_draws_run_position_by_position() {
        let first = bits("10110");
        let second = bits("01101");
        let operator = UniformBitstringCrossover::new(2, 3).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(23);
        let offspring = operator.crossover(&[&first, &second], &mut rng).unwrap();

        let sources = [first.as_bits().unwrap(), second.as_bits().unwrap()];
        let mut replay = RandomNumberGenerator::from_seed(23);
        let mut expected = vec![Vec::new(); 3];
        for position in 0..5 {
            for child in expected.iter_mut() {
                child.push(sources[replay.gen_range(0..2usize)][position]);
            }
        }
        // both parents set position 2, so no child needs a repair draw
        let expected: Vec<Representation> =
            expected.into_iter().map(Representation::BinaryVector).collect();
        assert_eq!(offspring, expected);
    }

    #[test]
    fn test_all_zero_parents_are_repaired() {
        let operator = UniformBitstringCrossover::new(3, 4).unwrap();
        let zero = bits("000000");
        let mut rng = RandomNumberGenerator::from_seed(17);

        let offspring = operator.crossover(&[&zero, &zero, &zero], &mut rng).unwrap();
        assert_eq!(offspring.len(), 4);
        for child in offspring {
            let ones = child.as_bits().unwrap().iter().filter(|&&b| b).count();
            assert_eq!(ones, 1);
        }
    }

    #[test]
    fn test_rejects_wrong_parents() {
        let operator = UniformBitstringCrossover::new(2, 1).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(1);

        assert!(matches!(
            operator.crossover(&[&bits("1100")], &mut rng),
            Err(OptimizerError::ShapeMismatch(_))
        ));
        assert!(matches!(
            operator.crossover(&[&bits("1100"), &bits("110")], &mut rng),
            Err(OptimizerError::ShapeMismatch(_))
        ));
        assert!(matches!(
            operator.crossover(&[&bits("1100"), &Representation::IntegerVector(vec![1, 1, 0, 0])], &mut rng),
            Err(OptimizerError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_zero_arity_rejected() {
        assert!(matches!(
            UniformBitstringCrossover::new(0, 1),
            Err(OptimizerError::Configuration(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_offspring_shape_and_origin(
            parents in (1usize..40).prop_flat_map(|n| prop::collection::vec(prop::collection::vec(any::<bool>(), n), 1..5)),
            offspring_count in 1usize..4,
            seed in any::<u64>(),
        ) {
            let operator = UniformBitstringCrossover::new(parents.len(), offspring_count).unwrap();
            let reps: Vec<Representation> = parents.iter().cloned().map(Representation::BinaryVector).collect();
            let refs: Vec<&Representation> = reps.iter().collect();
            let mut rng = RandomNumberGenerator::from_seed(seed);

            let offspring = operator.crossover(&refs, &mut rng).unwrap();
            prop_assert_eq!(offspring.len(), offspring_count);
            for child in &offspring {
                let child_bits = child.as_bits().unwrap();
                prop_assert_eq!(child_bits.len(), parents[0].len());
                prop_assert!(child_bits.iter().any(|&b| b));
                let repaired = parents.iter().all(|p| p.iter().all(|&b| !b));
                if !repaired {
                    for (position, &bit) in child_bits.iter().enumerate() {
                        let possible = parents.iter().any(|p| p[position] == bit);
                        let all_zero_column = parents.iter().all(|p| !p[position]);
                        prop_assert!(possible || all_zero_column);
                    }
                }
            }
        }
    }
}
