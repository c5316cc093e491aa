//! # evotune
//!
//! The core of a generational multi-objective evolution strategy for tuning the
//! hyperparameters of an expensive external pipeline.
//!
//! The crate provides the genome representations, crossover and mutation
//! operators, Pareto dominance with fast non-dominated sorting, and the plus,
//! comma and hypervolume (SMS-EMOA) replacement strategies. Evaluating an
//! individual is left to the caller through [`evolution::FitnessEvaluator`]; the
//! generation loop itself belongs to the driver.
//!
//! Every random decision draws from one [`rng::RandomNumberGenerator`] passed into
//! each operator, so a seeded run is reproducible.

pub mod crossover;
pub mod dominance;
pub mod error;
pub mod evolution;
pub mod individual;
pub mod log_format;
pub mod mutation;
pub mod population;
pub mod representation;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::{OptimizerError, OptionExt, Result, ResultExt};
pub use individual::{Fitness, Gene, Individual, Objective};
pub use population::Population;
pub use representation::Representation;
