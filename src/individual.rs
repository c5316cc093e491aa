//! # Individual
//!
//! An individual is one candidate hyperparameter configuration: an ordered, named
//! genome plus the objective values the external pipeline measured for it.
//!
//! ## Example
//!
//! ```rust
//! use evotune::individual::{Fitness, Gene, Individual, Objective};
//! use evotune::representation::Representation;
//!
//! let mut individual = Individual::new(vec![Gene::new(
//!     "selected features",
//!     Representation::BinaryVector(vec![true, false, true]),
//! )]);
//! assert!(!individual.is_evaluated());
//!
//! individual.set_fitness(Fitness::training(vec![Objective::new(0, "error", 0.12, true)]));
//! assert_eq!(individual.primary_value(), Some(0.12));
//! ```

use rand::RngCore;

use crate::{
    error::{OptimizerError, Result},
    evolution::{FitnessEvaluator, OptimizerOptions},
    representation::Representation,
};

/// One scalar fitness dimension.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub id: usize,
    pub name: String,
    pub value: f64,
    pub minimize: bool,
}

impl Objective {
    /// Creates a new objective value.
    ///
    /// # Arguments
    ///
    /// * `id` - The position of the objective in the fitness vector.
    /// * `name` - A human-readable name.
    /// * `value` - The measured value.
    /// * `minimize` - Whether lower values are better (true) or higher values are better (false).
    pub fn new(id: usize, name: impl Into<String>, value: f64, minimize: bool) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            minimize,
        }
    }

    /// Whether `self` is strictly better than `other` in this objective's direction.
    pub fn is_better_than(&self, other: &Objective) -> bool {
        if self.minimize {
            self.value < other.value
        } else {
            self.value > other.value
        }
    }

    /// Whether `self` is strictly worse than `other` in this objective's direction.
    pub fn is_worse_than(&self, other: &Objective) -> bool {
        other.is_better_than(self)
    }
}

/// Objective vectors returned by the fitness evaluation callback.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fitness {
    pub training: Vec<Objective>,
    pub test: Option<Vec<Objective>>,
}

impl Fitness {
    /// Fitness measured on the training data only.
    pub fn training(training: Vec<Objective>) -> Self {
        Self {
            training,
            test: None,
        }
    }

    /// Fitness measured on the training data and an independent test set.
    ///
    /// Only `training` takes part in selection; `test` is carried along for the log.
    pub fn with_test(training: Vec<Objective>, test: Vec<Objective>) -> Self {
        Self {
            training,
            test: Some(test),
        }
    }
}

/// A named gene of the genome.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub name: String,
    pub value: Representation,
}

impl Gene {
    pub fn new(name: impl Into<String>, value: Representation) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A candidate solution: an ordered genome and, once evaluated, its fitness.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    genome: Vec<Gene>,
    fitness: Fitness,
}

impl Individual {
    /// Creates an unevaluated individual.
    pub fn new(genome: Vec<Gene>) -> Self {
        Self {
            genome,
            fitness: Fitness::default(),
        }
    }

    /// Creates an individual that is already evaluated, e.g. when reading a log.
    pub fn with_fitness(genome: Vec<Gene>, fitness: Fitness) -> Self {
        Self { genome, fitness }
    }

    /// Draws a random genome following the configured gene specs.
    pub fn random(options: &OptimizerOptions, rng: &mut dyn RngCore) -> Self {
        let genome = options
            .get_genes()
            .iter()
            .map(|spec| Gene::new(spec.name(), spec.random(rng)))
            .collect();
        Self::new(genome)
    }

    /// Returns the genes in genome order.
    pub fn genome(&self) -> &[Gene] {
        &self.genome
    }

    /// Looks up a gene value by name.
    pub fn gene(&self, name: &str) -> Option<&Representation> {
        self.genome
            .iter()
            .find(|gene| gene.name == name)
            .map(|gene| &gene.value)
    }

    /// Replaces the gene at `index` with a new value of the same shape.
    pub fn replace_gene(&mut self, index: usize, value: Representation) -> Result<()> {
        let gene = self.genome.get_mut(index).ok_or_else(|| {
            OptimizerError::ShapeMismatch(format!("genome has no gene at index {}", index))
        })?;
        if !gene.value.same_shape(&value) {
            return Err(OptimizerError::ShapeMismatch(format!(
                "gene '{}' expects the shape of '{}', got '{}'",
                gene.name, gene.value, value
            )));
        }
        gene.value = value;
        Ok(())
    }

    pub fn genome_mut(&mut self) -> &mut [Gene] {
        &mut self.genome
    }

    pub fn fitness(&self) -> &Fitness {
        &self.fitness
    }

    /// The objective vector used for selection. Empty until evaluated.
    pub fn training_fitness(&self) -> &[Objective] {
        &self.fitness.training
    }

    pub fn test_fitness(&self) -> Option<&[Objective]> {
        self.fitness.test.as_deref()
    }

    pub fn set_fitness(&mut self, fitness: Fitness) {
        self.fitness = fitness;
    }

    /// Whether a fitness evaluation has been stored.
    pub fn is_evaluated(&self) -> bool {
        !self.fitness.training.is_empty()
    }

    /// Value of the first training objective.
    pub fn primary_value(&self) -> Option<f64> {
        self.fitness.training.first().map(|objective| objective.value)
    }

    /// Whether this genome has the same gene names and shapes as `other`.
    pub fn same_genome_shape(&self, other: &Individual) -> bool {
        self.genome.len() == other.genome.len()
            && self
                .genome
                .iter()
                .zip(&other.genome)
                .all(|(a, b)| a.name == b.name && a.value.same_shape(&b.value))
    }

    /// Checks the genome against the configured gene specs.
    pub fn check_genome(&self, options: &OptimizerOptions) -> Result<()> {
        let specs = options.get_genes();
        if specs.len() != self.genome.len() {
            return Err(OptimizerError::ShapeMismatch(format!(
                "genome has {} genes, {} configured",
                self.genome.len(),
                specs.len()
            )));
        }
        for (spec, gene) in specs.iter().zip(&self.genome) {
            if spec.name() != gene.name || !spec.matches(&gene.value) {
                return Err(OptimizerError::ShapeMismatch(format!(
                    "gene '{}' = '{}' does not fit configured gene '{}'",
                    gene.name,
                    gene.value,
                    spec.name()
                )));
            }
        }
        Ok(())
    }

    /// Checks the fitness vectors against the configured objectives.
    pub fn check_fitness(&self, options: &OptimizerOptions) -> Result<()> {
        check_objectives("training", &self.fitness.training, options)?;
        match (&self.fitness.test, options.uses_independent_test_set()) {
            (Some(test), true) => check_objectives("test", test, options),
            (None, false) => Ok(()),
            (Some(_), false) => Err(OptimizerError::ShapeMismatch(
                "test fitness present but no independent test set is configured".to_string(),
            )),
            (None, true) => Err(OptimizerError::ShapeMismatch(
                "independent test set configured but test fitness is missing".to_string(),
            )),
        }
    }

    /// Runs the external evaluation and stores the result after checking its shape.
    pub fn evaluate<E>(&mut self, evaluator: &E, options: &OptimizerOptions) -> Result<()>
    where
        E: FitnessEvaluator + ?Sized,
    {
        let fitness = evaluator.evaluate(&self.genome)?;
        let previous = std::mem::replace(&mut self.fitness, fitness);
        if let Err(e) = self.check_fitness(options) {
            self.fitness = previous;
            return Err(e);
        }
        Ok(())
    }
}

fn check_objectives(label: &str, objectives: &[Objective], options: &OptimizerOptions) -> Result<()> {
    let specs = options.get_objectives();
    if objectives.len() != specs.len() {
        return Err(OptimizerError::ShapeMismatch(format!(
            "{} fitness has {} objectives, {} configured",
            label,
            objectives.len(),
            specs.len()
        )));
    }
    for (spec, objective) in specs.iter().zip(objectives) {
        if spec.id != objective.id || spec.minimize != objective.minimize {
            return Err(OptimizerError::ShapeMismatch(format!(
                "{} objective '{}' does not match configured objective '{}'",
                label, objective.name, spec.name
            )));
        }
    }
    Ok(())
}
