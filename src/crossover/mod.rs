//! # Crossover
//!
//! Recombination operators for bit string genes. An operator consumes a fixed
//! number of parent representations of identical shape and produces a fixed number
//! of offspring representations; any offspring left without a set bit is repaired.
//!
//! ## Example
//!
//! ```rust
//! use evotune::crossover::{Crossover, UniformBitstringCrossover};
//! use evotune::representation::Representation;
//! use evotune::rng::RandomNumberGenerator;
//!
//! let a = Representation::BinaryVector(vec![true, true, false, false]);
//! let b = Representation::BinaryVector(vec![true, false, true, false]);
//!
//! let operator = UniformBitstringCrossover::new(2, 1).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(5);
//! let offspring = operator.crossover(&[&a, &b], &mut rng).unwrap();
//!
//! assert_eq!(offspring.len(), 1);
//! assert!(offspring[0].same_shape(&a));
//! ```

pub mod commonality;
pub mod uniform;

pub use commonality::CommonalityBasedBitstringCrossover;
pub use uniform::UniformBitstringCrossover;

use std::fmt::Debug;

use rand::RngCore;
use tracing::debug;

use crate::{
    error::{OptimizerError, Result},
    evolution::CrossoverSettings,
    individual::{Gene, Individual},
    representation::{repair_empty_mask, Representation},
};

/// A recombination operator over representations.
pub trait Crossover: Debug + Send + Sync {
    /// The name under which the operator is configured and reported.
    fn name(&self) -> &'static str;

    /// Number of parents consumed by one call.
    fn parent_count(&self) -> usize;

    /// Number of offspring produced by one call.
    fn offspring_count(&self) -> usize;

    /// Produces `offspring_count()` offspring from exactly `parent_count()` parents.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the parent count is wrong, a parent is not a
    /// binary vector, or the parents differ in length.
    fn crossover(
        &self,
        parents: &[&Representation],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Representation>>;
}

/// Checks the parents of a bit string crossover and returns their bits.
pub(crate) fn parent_bits<'a>(
    expected: usize,
    parents: &[&'a Representation],
) -> Result<Vec<&'a [bool]>> {
    if parents.len() != expected {
        return Err(OptimizerError::ShapeMismatch(format!(
            "expected {} parents, got {}",
            expected,
            parents.len()
        )));
    }

    let bits = parents
        .iter()
        .map(|parent| parent.as_bits())
        .collect::<Result<Vec<&[bool]>>>()?;

    if let Some(first) = bits.first() {
        if let Some((index, other)) = bits.iter().enumerate().find(|(_, b)| b.len() != first.len()) {
            return Err(OptimizerError::ShapeMismatch(format!(
                "parent {} has {} bits, parent 0 has {}",
                index,
                other.len(),
                first.len()
            )));
        }
    }
    Ok(bits)
}

/// Repairs an offspring bit string and rebuilds it with the variant of the first parent.
pub(crate) fn finish_offspring(
    operator: &str,
    template: &Representation,
    mut bits: Vec<bool>,
    rng: &mut dyn RngCore,
) -> Result<Representation> {
    if repair_empty_mask(&mut bits, rng) {
        debug!(operator, "Repaired all-zero offspring");
    }
    template.with_bits(bits)
}

/// Builds a crossover operator from its configured name and arity.
pub fn from_options(settings: &CrossoverSettings) -> Result<Box<dyn Crossover>> {
    match settings.name.as_str() {
        "UniformBitstringCrossover" => Ok(Box::new(UniformBitstringCrossover::new(
            settings.parent_count,
            settings.offspring_count,
        )?)),
        "CommonalityBasedBitstringCrossover" => {
            if settings.parent_count != 2 {
                return Err(OptimizerError::Configuration(format!(
                    "CommonalityBasedBitstringCrossover takes 2 parents, {} configured",
                    settings.parent_count
                )));
            }
            Ok(Box::new(CommonalityBasedBitstringCrossover::new(
                settings.offspring_count,
            )?))
        }
        other => Err(OptimizerError::Configuration(format!(
            "Unknown crossover operator '{}'",
            other
        ))),
    }
}

/// Recombines whole individuals gene by gene.
///
/// Binary vector genes go through `operator`; genes of any other variant are copied
/// from the first parent. Returns `operator.offspring_count()` unevaluated individuals.
///
/// # Errors
///
/// Operator failures are attributed to `operator` and the positions of the parents
/// in `parents`. Parents with different genome shapes are a `ShapeMismatch`.
pub fn recombine(
    operator: &dyn Crossover,
    parents: &[&Individual],
    rng: &mut dyn RngCore,
) -> Result<Vec<Individual>> {
    let positions: Vec<usize> = (0..parents.len()).collect();
    let first = match parents.first() {
        Some(first) if parents.len() == operator.parent_count() => *first,
        _ => {
            return Err(OptimizerError::ShapeMismatch(format!(
                "expected {} parents, got {}",
                operator.parent_count(),
                parents.len()
            ))
            .in_operator(operator.name(), positions))
        }
    };
    if let Some(index) = parents.iter().position(|p| !p.same_genome_shape(first)) {
        return Err(OptimizerError::ShapeMismatch(format!(
            "parent {} has a different genome shape than parent 0",
            index
        ))
        .in_operator(operator.name(), positions));
    }

    let mut genomes: Vec<Vec<Gene>> = vec![Vec::with_capacity(first.genome().len()); operator.offspring_count()];
    for (gene_index, gene) in first.genome().iter().enumerate() {
        match gene.value {
            Representation::BinaryVector(_) => {
                let operands: Vec<&Representation> = parents
                    .iter()
                    .map(|parent| &parent.genome()[gene_index].value)
                    .collect();
                let children = operator
                    .crossover(&operands, rng)
                    .map_err(|e| e.in_operator(operator.name(), positions.clone()))?;
                for (genome, child) in genomes.iter_mut().zip(children) {
                    genome.push(Gene::new(gene.name.clone(), child));
                }
            }
            _ => {
                for genome in genomes.iter_mut() {
                    genome.push(gene.clone());
                }
            }
        }
    }

    Ok(genomes.into_iter().map(Individual::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;

    fn individual(mask: &[bool], window: i64) -> Individual {
        Individual::new(vec![
            Gene::new("mask", Representation::BinaryVector(mask.to_vec())),
            Gene::new(
                "window",
                Representation::IntegerScalar {
                    value: window,
                    min: 0,
                    max: 100,
                },
            ),
        ])
    }

    #[test]
    fn test_from_options() {
        let uniform = from_options(&CrossoverSettings::new("UniformBitstringCrossover", 3, 2)).unwrap();
        assert_eq!(uniform.name(), "UniformBitstringCrossover");
        assert_eq!(uniform.parent_count(), 3);
        assert_eq!(uniform.offspring_count(), 2);

        let commonality =
            from_options(&CrossoverSettings::new("CommonalityBasedBitstringCrossover", 2, 1)).unwrap();
        assert_eq!(commonality.parent_count(), 2);

        assert!(matches!(
            from_options(&CrossoverSettings::new("CommonalityBasedBitstringCrossover", 3, 1)),
            Err(OptimizerError::Configuration(_))
        ));
        assert!(matches!(
            from_options(&CrossoverSettings::new("OnePointCrossover", 2, 1)),
            Err(OptimizerError::Configuration(_))
        ));
    }

    #[test]
    fn test_parent_bits_checks_shape() {
        let a = Representation::BinaryVector(vec![true, false]);
        let b = Representation::BinaryVector(vec![true]);
        let c = Representation::IntegerVector(vec![1, 2]);

        assert!(parent_bits(2, &[&a, &a]).is_ok());
        assert!(matches!(parent_bits(2, &[&a]), Err(OptimizerError::ShapeMismatch(_))));
        assert!(matches!(parent_bits(2, &[&a, &b]), Err(OptimizerError::ShapeMismatch(_))));
        assert!(matches!(parent_bits(2, &[&a, &c]), Err(OptimizerError::ShapeMismatch(_))));
    }

    #[test]
    fn test_recombine_copies_non_binary_genes_from_first_parent() {
        let operator = UniformBitstringCrossover::new(2, 3).unwrap();
        let a = individual(&[true, false, true, false], 7);
        let b = individual(&[false, true, false, true], 42);
        let mut rng = RandomNumberGenerator::from_seed(9);

        let offspring = recombine(&operator, &[&a, &b], &mut rng).unwrap();
        assert_eq!(offspring.len(), 3);
        for child in &offspring {
            assert!(child.same_genome_shape(&a));
            assert!(!child.is_evaluated());
            assert_eq!(child.gene("window"), a.gene("window"));
        }
    }

    #[test]
    fn test_recombine_attributes_errors() {
        let operator = UniformBitstringCrossover::new(2, 1).unwrap();
        let a = individual(&[true, false, true, false], 7);
        let b = individual(&[true, false], 7);
        let mut rng = RandomNumberGenerator::from_seed(9);

        let err = recombine(&operator, &[&a, &b], &mut rng).unwrap_err();
        assert_eq!(err.indices(), Some(&[0, 1][..]));
        assert!(matches!(err.root(), OptimizerError::ShapeMismatch(_)));

        let err = recombine(&operator, &[&a], &mut rng).unwrap_err();
        assert!(matches!(err.root(), OptimizerError::ShapeMismatch(_)));
    }
}
