//! # Error Types
//!
//! This module defines the error type shared by every operator of the optimizer.
//! Errors are never swallowed inside the core: a corrupted individual or a
//! malformed log line is always handed back to the driver, which decides whether
//! to abort the run or to skip the generation.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use evotune::error::{OptimizerError, Result};
//!
//! fn check_parent_count(count: usize) -> Result<()> {
//!     if count != 2 {
//!         return Err(OptimizerError::ShapeMismatch(format!(
//!             "expected 2 parents, got {}",
//!             count
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_parent_count(2).is_ok());
//! assert!(check_parent_count(3).is_err());
//! ```
//!
//! Attributing a failure to an operator and the individuals it was working on:
//!
//! ```rust
//! use evotune::error::OptimizerError;
//!
//! let err = OptimizerError::Parse("invalid digit".to_string())
//!     .in_operator("PlusSelection", vec![3, 7]);
//! assert_eq!(err.indices(), Some(&[3, 7][..]));
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use evotune::error::{OptimizerError, OptionExt};
//!
//! fn first_value(values: &[f64]) -> evotune::error::Result<f64> {
//!     values.first().copied().ok_or_else_optimizer(|| OptimizerError::EmptyPopulation)
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while evolving a population.
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// Operand genomes or objective vectors have incompatible length or type.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A serialized representation or log line could not be read back.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An operand cannot be processed without an explicit policy, e.g. NaN objective values.
    #[error("Degenerate operand: {0}")]
    DegenerateOperand(String),

    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// A failure attributed to a named operator and the individuals it was processing.
    #[error("Operator '{operator}' failed on individuals {indices:?}: {source}")]
    Operator {
        operator: String,
        indices: Vec<usize>,
        #[source]
        source: Box<OptimizerError>,
    },

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

impl OptimizerError {
    /// Wraps this error with the name of the failing operator and the combined
    /// population indices that triggered it.
    ///
    /// Wrapping an error that is already attributed keeps the innermost attribution.
    pub fn in_operator(self, operator: impl Into<String>, indices: Vec<usize>) -> Self {
        match self {
            attributed @ OptimizerError::Operator { .. } => attributed,
            other => OptimizerError::Operator {
                operator: operator.into(),
                indices,
                source: Box::new(other),
            },
        }
    }

    /// Returns the individual indices attached by [`in_operator`](Self::in_operator), if any.
    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            OptimizerError::Operator { indices, .. } => Some(indices),
            _ => None,
        }
    }

    /// Returns the underlying error, looking through operator attribution.
    pub fn root(&self) -> &OptimizerError {
        match self {
            OptimizerError::Operator { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A specialized Result type for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use evotune::error::ResultExt;
///
/// fn parse_seed(raw: &str) -> evotune::error::Result<u64> {
///     raw.parse::<u64>().context("Failed to read seed")
/// }
///
/// assert!(parse_seed("42").is_ok());
/// assert!(parse_seed("forty-two").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to an `OptimizerError` carrying the given context.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| OptimizerError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, OptimizerError>` using a closure
    /// to generate the error.
    fn ok_or_else_optimizer<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> OptimizerError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_optimizer<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> OptimizerError,
    {
        self.ok_or_else(err_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_operator_attaches_indices() {
        let err = OptimizerError::ShapeMismatch("length 3 vs 4".to_string())
            .in_operator("UniformBitstringCrossover", vec![0, 1]);

        assert_eq!(err.indices(), Some(&[0, 1][..]));
        assert!(matches!(err.root(), OptimizerError::ShapeMismatch(_)));
        assert!(err.to_string().contains("UniformBitstringCrossover"));
    }

    #[test]
    fn test_in_operator_keeps_innermost_attribution() {
        let err = OptimizerError::Parse("x".to_string())
            .in_operator("inner", vec![5])
            .in_operator("outer", vec![1, 2]);

        match err {
            OptimizerError::Operator {
                operator, indices, ..
            } => {
                assert_eq!(operator, "inner");
                assert_eq!(indices, vec![5]);
            }
            _ => panic!("Expected Operator error"),
        }
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }

        assert!(matches!(fails(), Err(OptimizerError::Io(_))));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<u8> = None;
        let result = none.ok_or_else_optimizer(|| OptimizerError::EmptyPopulation);
        assert!(matches!(result, Err(OptimizerError::EmptyPopulation)));
    }
}
