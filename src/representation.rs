//! # Representation
//!
//! A `Representation` encodes one gene of an individual. The set of encodings is
//! closed: a feature-selection bit mask, a bounded integer scalar, and an integer
//! vector. Every variant renders to a string and can be rebuilt from it, which is
//! what the persisted experiment log relies on when a run is resumed.
//!
//! ## Example
//!
//! ```rust
//! use evotune::representation::Representation;
//!
//! let mask = Representation::BinaryVector(vec![true, false, true]);
//! assert_eq!(mask.to_string(), "101");
//! assert_eq!(Representation::parse_binary_vector("101"), mask);
//!
//! let window = Representation::IntegerScalar { value: 512, min: 64, max: 4096 };
//! let back = Representation::parse_integer_scalar("512", 64, 4096).unwrap();
//! assert_eq!(back, window);
//! ```

use std::fmt;

use rand::{Rng, RngCore};

use crate::error::{OptimizerError, Result};

/// One gene of an individual.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Feature-selection style mask.
    BinaryVector(Vec<bool>),
    /// A single bounded hyperparameter. The value is not clamped on construction.
    IntegerScalar { value: i64, min: i64, max: i64 },
    /// An ordered list of integers.
    IntegerVector(Vec<i64>),
}

/// Tag of a [`Representation`] variant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    BinaryVector,
    IntegerScalar,
    IntegerVector,
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepresentationKind::BinaryVector => "BinaryVector",
            RepresentationKind::IntegerScalar => "IntegerScalar",
            RepresentationKind::IntegerVector => "IntegerVector",
        };
        f.write_str(name)
    }
}

impl Representation {
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Representation::BinaryVector(_) => RepresentationKind::BinaryVector,
            Representation::IntegerScalar { .. } => RepresentationKind::IntegerScalar,
            Representation::IntegerVector(_) => RepresentationKind::IntegerVector,
        }
    }

    /// Number of positions: vector length, or 1 for a scalar.
    pub fn len(&self) -> usize {
        match self {
            Representation::BinaryVector(bits) => bits.len(),
            Representation::IntegerScalar { .. } => 1,
            Representation::IntegerVector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` has the same variant, the same length and, for scalars, the same bounds.
    pub fn same_shape(&self, other: &Representation) -> bool {
        match (self, other) {
            (Representation::BinaryVector(a), Representation::BinaryVector(b)) => a.len() == b.len(),
            (
                Representation::IntegerScalar { min, max, .. },
                Representation::IntegerScalar {
                    min: other_min,
                    max: other_max,
                    ..
                },
            ) => min == other_min && max == other_max,
            (Representation::IntegerVector(a), Representation::IntegerVector(b)) => a.len() == b.len(),
            _ => false,
        }
    }

    /// Returns the bits of a binary vector, or a shape mismatch for any other variant.
    pub fn as_bits(&self) -> Result<&[bool]> {
        match self {
            Representation::BinaryVector(bits) => Ok(bits),
            other => Err(OptimizerError::ShapeMismatch(format!(
                "expected BinaryVector, got {}",
                other.kind()
            ))),
        }
    }

    /// Mutable access to the bits of a binary vector.
    pub fn as_bits_mut(&mut self) -> Result<&mut Vec<bool>> {
        match self {
            Representation::BinaryVector(bits) => Ok(bits),
            other => Err(OptimizerError::ShapeMismatch(format!(
                "expected BinaryVector, got {}",
                other.kind()
            ))),
        }
    }

    /// Rebuilds a representation of the same variant as `self` from new bits.
    ///
    /// Only binary vectors can be rebuilt from bits; any other variant is a shape mismatch.
    pub fn with_bits(&self, bits: Vec<bool>) -> Result<Representation> {
        match self {
            Representation::BinaryVector(_) => Ok(Representation::BinaryVector(bits)),
            other => Err(OptimizerError::ShapeMismatch(format!(
                "cannot rebuild {} from a bit string",
                other.kind()
            ))),
        }
    }

    /// Maps `'1'` to `true` and every other character to `false`.
    pub fn parse_binary_vector(s: &str) -> Representation {
        Representation::BinaryVector(s.chars().map(|c| c == '1').collect())
    }

    /// Parses a decimal integer. The bounds are not part of the string and must be
    /// supplied by the gene configuration.
    pub fn parse_integer_scalar(s: &str, min: i64, max: i64) -> Result<Representation> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|e| OptimizerError::Parse(format!("integer scalar '{}': {}", s, e)))?;
        Ok(Representation::IntegerScalar { value, min, max })
    }

    /// Parses whitespace separated decimal integers.
    pub fn parse_integer_vector(s: &str) -> Result<Representation> {
        let values = s
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|e| OptimizerError::Parse(format!("integer vector token '{}': {}", token, e)))
            })
            .collect::<Result<Vec<i64>>>()?;
        Ok(Representation::IntegerVector(values))
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::BinaryVector(bits) => {
                for &bit in bits {
                    f.write_str(if bit { "1" } else { "0" })?;
                }
                Ok(())
            }
            Representation::IntegerScalar { value, .. } => write!(f, "{}", value),
            Representation::IntegerVector(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

/// Sets one uniformly chosen bit if no bit is set.
///
/// Keeps a feature mask from selecting no feature at all. Returns whether a bit was set.
pub fn repair_empty_mask(bits: &mut [bool], rng: &mut dyn RngCore) -> bool {
    if bits.is_empty() || bits.iter().any(|&bit| bit) {
        return false;
    }
    let position = rng.gen_range(0..bits.len());
    bits[position] = true;
    true
}
