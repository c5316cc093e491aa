//! # OptimizerOptions
//!
//! The read-only per-run configuration: population sizes, objectives, genes,
//! whether an independent test set is evaluated, the seed, and which crossover and
//! selection operators the driver wires in.
//!
//! ## Example
//!
//! ```rust
//! use evotune::evolution::{GeneSpec, ObjectiveSpec, OptimizerOptions, SelectionKind};
//!
//! let options = OptimizerOptions::builder()
//!     .parent_population_size(10)
//!     .offspring_population_size(1)
//!     .objective(ObjectiveSpec::new(0, "classification error", true))
//!     .objective(ObjectiveSpec::new(1, "feature rate", true))
//!     .gene(GeneSpec::binary_vector("selected features", 128))
//!     .gene(GeneSpec::integer_scalar("partition size", 500, 30000))
//!     .selection(SelectionKind::Hypervolume)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(options.get_parent_population_size(), 10);
//! ```

use std::{fmt, str::FromStr};

use tracing::warn;

use crate::{
    error::{OptimizerError, Result},
    individual::Objective,
};

use super::gene_spec::GeneSpec;

/// Identifies one objective of the run and its direction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveSpec {
    pub id: usize,
    pub name: String,
    pub minimize: bool,
}

impl ObjectiveSpec {
    /// Creates a new objective.
    ///
    /// # Arguments
    ///
    /// * `id` - The position of the objective in every fitness vector.
    /// * `name` - A human-readable name, used in logs and error messages.
    /// * `minimize` - Whether lower values are better (true) or higher values are better (false).
    pub fn new(id: usize, name: impl Into<String>, minimize: bool) -> Self {
        Self {
            id,
            name: name.into(),
            minimize,
        }
    }

    /// Tags a measured value with this objective.
    pub fn measure(&self, value: f64) -> Objective {
        Objective::new(self.id, self.name.clone(), value, self.minimize)
    }
}

/// Named crossover operator and its arity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossoverSettings {
    pub name: String,
    pub parent_count: usize,
    pub offspring_count: usize,
}

impl CrossoverSettings {
    /// Creates crossover settings for the operator registered under `name`.
    pub fn new(name: impl Into<String>, parent_count: usize, offspring_count: usize) -> Self {
        Self {
            name: name.into(),
            parent_count,
            offspring_count,
        }
    }
}

/// Environmental selection applied at the end of each generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionKind {
    /// Best `P` of parents and offspring by the first objective.
    #[default]
    Plus,
    /// Best `P` of the offspring only by the first objective.
    Comma,
    /// Pareto fronts with delta-S removal from the worst front.
    Hypervolume,
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionKind::Plus => "PlusSelection",
            SelectionKind::Comma => "CommaSelection",
            SelectionKind::Hypervolume => "HypervolumeSelection",
        };
        f.write_str(name)
    }
}

impl FromStr for SelectionKind {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "PlusSelection" | "plus" | "+" => Ok(SelectionKind::Plus),
            "CommaSelection" | "comma" | "," => Ok(SelectionKind::Comma),
            "HypervolumeSelection" | "hypervolume" | "SMS-EMOA" => Ok(SelectionKind::Hypervolume),
            other => Err(OptimizerError::Configuration(format!(
                "Unknown selection strategy '{}'",
                other
            ))),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOptions {
    parent_population_size: usize,
    offspring_population_size: usize,
    objectives: Vec<ObjectiveSpec>,
    genes: Vec<GeneSpec>,
    independent_test_set: bool,
    seed: Option<u64>,
    crossover: Option<CrossoverSettings>,
    selection: SelectionKind,
}

impl OptimizerOptions {
    /// Returns a builder for creating an `OptimizerOptions` instance.
    pub fn builder() -> OptimizerOptionsBuilder {
        OptimizerOptionsBuilder::default()
    }

    /// Returns the number of parents `P` kept between generations.
    pub fn get_parent_population_size(&self) -> usize {
        self.parent_population_size
    }

    /// Returns the number of offspring `O` created per generation.
    pub fn get_offspring_population_size(&self) -> usize {
        self.offspring_population_size
    }

    /// Returns the objectives in fitness-vector order.
    pub fn get_objectives(&self) -> &[ObjectiveSpec] {
        &self.objectives
    }

    /// Returns the genes in genome order.
    pub fn get_genes(&self) -> &[GeneSpec] {
        &self.genes
    }

    pub fn uses_independent_test_set(&self) -> bool {
        self.independent_test_set
    }

    /// Returns the seed of the run, if any. Without one the run is not reproducible.
    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn get_crossover(&self) -> Option<&CrossoverSettings> {
        self.crossover.as_ref()
    }

    /// Returns the replacement strategy of the run.
    pub fn get_selection(&self) -> SelectionKind {
        self.selection
    }

    /// Checks every constraint the operators rely on.
    ///
    /// Called by the builder; call it again after deserializing options.
    pub fn validate(&self) -> Result<()> {
        if self.parent_population_size == 0 {
            return Err(OptimizerError::Configuration(
                "Parent population size cannot be zero".to_string(),
            ));
        }
        if self.offspring_population_size == 0 {
            return Err(OptimizerError::Configuration(
                "Offspring population size cannot be zero".to_string(),
            ));
        }
        if self.objectives.is_empty() {
            return Err(OptimizerError::Configuration(
                "At least one objective must be configured".to_string(),
            ));
        }
        if self.genes.is_empty() {
            return Err(OptimizerError::Configuration(
                "At least one gene must be configured".to_string(),
            ));
        }
        for gene in &self.genes {
            gene.validate()?;
        }

        match self.selection {
            SelectionKind::Hypervolume if self.objectives.len() != 2 => {
                return Err(OptimizerError::Configuration(format!(
                    "Hypervolume selection supports exactly two objectives, {} configured",
                    self.objectives.len()
                )));
            }
            SelectionKind::Comma if self.offspring_population_size < self.parent_population_size => {
                return Err(OptimizerError::Configuration(format!(
                    "Comma selection needs at least as many offspring ({}) as parents ({})",
                    self.offspring_population_size, self.parent_population_size
                )));
            }
            _ => {}
        }

        if let Some(crossover) = &self.crossover {
            if crossover.parent_count == 0 || crossover.offspring_count == 0 {
                return Err(OptimizerError::Configuration(format!(
                    "Crossover '{}' needs a positive parent and offspring count",
                    crossover.name
                )));
            }
            if crossover.parent_count > self.parent_population_size {
                return Err(OptimizerError::Configuration(format!(
                    "Crossover '{}' needs {} parents but the population holds {}",
                    crossover.name, crossover.parent_count, self.parent_population_size
                )));
            }
        }
        Ok(())
    }
}

const DEFAULT_PARENT_POPULATION_SIZE: usize = 10;
const DEFAULT_OFFSPRING_POPULATION_SIZE: usize = 1;

/// Builder for `OptimizerOptions`.
#[derive(Debug, Clone, Default)]
pub struct OptimizerOptionsBuilder {
    parent_population_size: Option<usize>,
    offspring_population_size: Option<usize>,
    objectives: Vec<ObjectiveSpec>,
    genes: Vec<GeneSpec>,
    independent_test_set: bool,
    seed: Option<u64>,
    crossover: Option<CrossoverSettings>,
    selection: Option<SelectionKind>,
}

impl OptimizerOptionsBuilder {
    /// Sets the number of parents.
    pub fn parent_population_size(mut self, value: usize) -> Self {
        self.parent_population_size = Some(value);
        self
    }

    /// Sets the number of offspring per generation.
    pub fn offspring_population_size(mut self, value: usize) -> Self {
        self.offspring_population_size = Some(value);
        self
    }

    /// Appends an objective; objectives keep the order in which they are added.
    pub fn objective(mut self, value: ObjectiveSpec) -> Self {
        self.objectives.push(value);
        self
    }

    /// Appends a gene; genes keep the order in which they are added.
    pub fn gene(mut self, value: GeneSpec) -> Self {
        self.genes.push(value);
        self
    }

    /// Sets whether each individual also carries objective values measured on an
    /// independent test set.
    pub fn independent_test_set(mut self, value: bool) -> Self {
        self.independent_test_set = value;
        self
    }

    /// Sets the seed of the run's random number generator.
    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Sets the crossover operator the driver should build.
    pub fn crossover(mut self, value: CrossoverSettings) -> Self {
        self.crossover = Some(value);
        self
    }

    /// Sets the replacement strategy.
    pub fn selection(mut self, value: SelectionKind) -> Self {
        self.selection = Some(value);
        self
    }

    /// Builds and validates the `OptimizerOptions` instance.
    ///
    /// Population sizes default to 10 parents and 1 offspring, selection to plus
    /// selection. Each fallback is logged at `warn` level.
    ///
    /// # Errors
    ///
    /// A `Configuration` error if [`OptimizerOptions::validate`] rejects the result.
    pub fn build(self) -> Result<OptimizerOptions> {
        let parent_population_size = self.parent_population_size.unwrap_or_else(|| {
            warn!(default = DEFAULT_PARENT_POPULATION_SIZE, "Parent population size not set");
            DEFAULT_PARENT_POPULATION_SIZE
        });
        let offspring_population_size = self.offspring_population_size.unwrap_or_else(|| {
            warn!(default = DEFAULT_OFFSPRING_POPULATION_SIZE, "Offspring population size not set");
            DEFAULT_OFFSPRING_POPULATION_SIZE
        });
        let selection = self.selection.unwrap_or_else(|| {
            let fallback = SelectionKind::default();
            warn!(default = %fallback, "Selection strategy not set");
            fallback
        });

        let options = OptimizerOptions {
            parent_population_size,
            offspring_population_size,
            objectives: self.objectives,
            genes: self.genes,
            independent_test_set: self.independent_test_set,
            seed: self.seed,
            crossover: self.crossover,
            selection,
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn base() -> OptimizerOptionsBuilder {
        OptimizerOptions::builder()
            .objective(ObjectiveSpec::new(0, "error", true))
            .gene(GeneSpec::binary_vector("features", 8))
    }

    #[test]
    fn test_defaults() {
        let options = base().build().unwrap();
        assert_eq!(options.get_parent_population_size(), 10);
        assert_eq!(options.get_offspring_population_size(), 1);
        assert_eq!(options.get_selection(), SelectionKind::Plus);
        assert!(!options.uses_independent_test_set());
        assert_eq!(options.get_seed(), None);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn build_logged(builder: OptimizerOptionsBuilder) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || builder.build().unwrap());
        let bytes = log.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_defaults_are_logged() {
        let log = build_logged(base());
        assert!(log.contains("WARN"));
        assert!(log.contains("Parent population size not set"));
        assert!(log.contains("Offspring population size not set"));
        assert!(log.contains("Selection strategy not set"));

        let log = build_logged(
            base()
                .parent_population_size(4)
                .offspring_population_size(4)
                .selection(SelectionKind::Comma),
        );
        assert!(!log.contains("WARN"));
    }

    #[test]
    fn test_zero_parent_population() {
        match base().parent_population_size(0).build() {
            Err(OptimizerError::Configuration(msg)) => {
                assert!(msg.contains("Parent population size cannot be zero"))
            }
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_missing_objectives_and_genes() {
        let no_objectives = OptimizerOptions::builder()
            .gene(GeneSpec::binary_vector("features", 8))
            .build();
        assert!(matches!(no_objectives, Err(OptimizerError::Configuration(_))));

        let no_genes = OptimizerOptions::builder()
            .objective(ObjectiveSpec::new(0, "error", true))
            .build();
        assert!(matches!(no_genes, Err(OptimizerError::Configuration(_))));
    }

    #[test]
    fn test_hypervolume_requires_two_objectives() {
        let result = base().selection(SelectionKind::Hypervolume).build();
        assert!(matches!(result, Err(OptimizerError::Configuration(_))));

        let result = base()
            .objective(ObjectiveSpec::new(1, "size", true))
            .selection(SelectionKind::Hypervolume)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_comma_requires_enough_offspring() {
        let result = base()
            .parent_population_size(5)
            .offspring_population_size(4)
            .selection(SelectionKind::Comma)
            .build();
        assert!(matches!(result, Err(OptimizerError::Configuration(_))));
    }

    #[test]
    fn test_crossover_arity_checked() {
        let result = base()
            .parent_population_size(2)
            .crossover(CrossoverSettings::new("UniformBitstringCrossover", 3, 1))
            .build();
        assert!(matches!(result, Err(OptimizerError::Configuration(_))));
    }

    #[test]
    fn test_selection_kind_from_str() {
        assert_eq!("PlusSelection".parse::<SelectionKind>().unwrap(), SelectionKind::Plus);
        assert_eq!(
            "HypervolumeSelection".parse::<SelectionKind>().unwrap(),
            SelectionKind::Hypervolume
        );
        assert!("TournamentSelection".parse::<SelectionKind>().is_err());
        assert_eq!(SelectionKind::Comma.to_string(), "CommaSelection");
    }

    #[test]
    fn test_objective_spec_measure() {
        let spec = ObjectiveSpec::new(3, "accuracy", false);
        let objective = spec.measure(0.75);
        assert_eq!(objective.id, 3);
        assert_eq!(objective.name, "accuracy");
        assert!(!objective.minimize);
        assert_eq!(objective.value, 0.75);
    }
}
