//! # GeneSpec
//!
//! The configured shape of one gene. A `GeneSpec` is the factory for every
//! representation of its gene: it draws random initial values and rebuilds values
//! from their logged strings. Integer scalar bounds are not part of the logged
//! string, so resuming a run always goes through the spec that re-supplies them.

use rand::{Rng, RngCore};
use tracing::debug;

use crate::{
    error::{OptimizerError, Result},
    representation::{repair_empty_mask, Representation},
};

/// Shape of a gene: variant plus length and/or bounds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneShape {
    BinaryVector { length: usize },
    IntegerScalar { min: i64, max: i64 },
    /// `min`/`max` only bound random initialization; logged values are not checked against them.
    IntegerVector { length: usize, min: i64, max: i64 },
}

/// A named gene of the genome.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneSpec {
    name: String,
    shape: GeneShape,
}

impl GeneSpec {
    /// Creates a new gene spec.
    ///
    /// # Arguments
    ///
    /// * `name` - The gene name; genomes look genes up by it.
    /// * `shape` - The variant of the gene together with its length and/or bounds.
    pub fn new(name: impl Into<String>, shape: GeneShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// A feature mask of `length` bits.
    pub fn binary_vector(name: impl Into<String>, length: usize) -> Self {
        Self::new(name, GeneShape::BinaryVector { length })
    }

    /// A single integer in `[min, max]`.
    pub fn integer_scalar(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::new(name, GeneShape::IntegerScalar { min, max })
    }

    /// `length` integers, initialized uniformly in `[min, max]`.
    pub fn integer_vector(name: impl Into<String>, length: usize, min: i64, max: i64) -> Self {
        Self::new(name, GeneShape::IntegerVector { length, min, max })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the variant with its length and/or bounds.
    pub fn shape(&self) -> &GeneShape {
        &self.shape
    }

    /// Checks that the shape can produce values at all.
    pub fn validate(&self) -> Result<()> {
        match self.shape {
            GeneShape::BinaryVector { length: 0 } => Err(OptimizerError::Configuration(format!(
                "Gene '{}' must have at least one bit",
                self.name
            ))),
            GeneShape::IntegerScalar { min, max } | GeneShape::IntegerVector { min, max, .. }
                if min > max =>
            {
                Err(OptimizerError::Configuration(format!(
                    "Gene '{}' has min {} greater than max {}",
                    self.name, min, max
                )))
            }
            _ => Ok(()),
        }
    }

    /// Whether `rep` could have been produced by this spec.
    pub fn matches(&self, rep: &Representation) -> bool {
        match (&self.shape, rep) {
            (GeneShape::BinaryVector { length }, Representation::BinaryVector(bits)) => {
                bits.len() == *length
            }
            (
                GeneShape::IntegerScalar { min, max },
                Representation::IntegerScalar {
                    min: rep_min,
                    max: rep_max,
                    ..
                },
            ) => min == rep_min && max == rep_max,
            (GeneShape::IntegerVector { length, .. }, Representation::IntegerVector(values)) => {
                values.len() == *length
            }
            _ => false,
        }
    }

    /// Draws a random value for this gene.
    ///
    /// Binary vectors get independent fair bits and are repaired if no bit came up set.
    pub fn random(&self, rng: &mut dyn RngCore) -> Representation {
        match self.shape {
            GeneShape::BinaryVector { length } => {
                let mut bits: Vec<bool> = (0..length).map(|_| rng.gen_bool(0.5)).collect();
                if repair_empty_mask(&mut bits, rng) {
                    debug!(gene = %self.name, "Repaired empty random mask");
                }
                Representation::BinaryVector(bits)
            }
            GeneShape::IntegerScalar { min, max } => Representation::IntegerScalar {
                value: rng.gen_range(min..=max),
                min,
                max,
            },
            GeneShape::IntegerVector { length, min, max } => Representation::IntegerVector(
                (0..length).map(|_| rng.gen_range(min..=max)).collect(),
            ),
        }
    }

    /// Rebuilds a value from its logged string.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed text, `ShapeMismatch` when the parsed vector has the wrong length.
    pub fn parse(&self, s: &str) -> Result<Representation> {
        let rep = match self.shape {
            GeneShape::BinaryVector { .. } => Representation::parse_binary_vector(s.trim()),
            GeneShape::IntegerScalar { min, max } => {
                Representation::parse_integer_scalar(s, min, max)?
            }
            GeneShape::IntegerVector { .. } => Representation::parse_integer_vector(s)?,
        };

        if !self.matches(&rep) {
            return Err(OptimizerError::ShapeMismatch(format!(
                "value '{}' does not fit gene '{}' ({:?})",
                s, self.name, self.shape
            )));
        }
        Ok(rep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RandomNumberGenerator;

    #[test]
    fn test_random_values_respect_shape() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        let specs = vec![
            GeneSpec::binary_vector("features", 12),
            GeneSpec::integer_scalar("window", 10, 20),
            GeneSpec::integer_vector("layers", 3, 1, 4),
        ];

        for _ in 0..50 {
            for spec in &specs {
                let rep = spec.random(&mut rng);
                assert!(spec.matches(&rep));
                match rep {
                    Representation::BinaryVector(bits) => assert!(bits.iter().any(|&b| b)),
                    Representation::IntegerScalar { value, .. } => {
                        assert!((10..=20).contains(&value))
                    }
                    Representation::IntegerVector(values) => {
                        assert!(values.iter().all(|v| (1..=4).contains(v)))
                    }
                }
            }
        }
    }

    #[test]
    fn test_random_is_reproducible() {
        let spec = GeneSpec::binary_vector("features", 32);
        let mut a = RandomNumberGenerator::from_seed(5);
        let mut b = RandomNumberGenerator::from_seed(5);

        assert_eq!(spec.random(&mut a), spec.random(&mut b));
    }

    #[test]
    fn test_parse_supplies_scalar_bounds() {
        let spec = GeneSpec::integer_scalar("partition", 500, 30000);
        let rep = spec.parse("1024").unwrap();
        assert_eq!(
            rep,
            Representation::IntegerScalar {
                value: 1024,
                min: 500,
                max: 30000
            }
        );
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let spec = GeneSpec::binary_vector("features", 4);
        assert!(matches!(
            spec.parse("101"),
            Err(OptimizerError::ShapeMismatch(_))
        ));

        let spec = GeneSpec::integer_vector("layers", 2, 0, 9);
        assert!(matches!(
            spec.parse("1 2 3"),
            Err(OptimizerError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(GeneSpec::binary_vector("empty", 0).validate().is_err());
        assert!(GeneSpec::integer_scalar("inverted", 5, 1).validate().is_err());
        assert!(GeneSpec::integer_vector("ok", 0, 1, 1).validate().is_ok());
    }
}
