//! # Log format
//!
//! One line per individual: the string form of every gene in genome order, then
//! the training objective values, then the test objective values when an
//! independent test set is used, all separated by commas. No representation
//! renders a comma, so the fields split unambiguously.
//!
//! Reading a line back needs the run configuration: the gene specs rebuild each
//! representation (integer scalar bounds are not part of the line) and the
//! objective specs restore ids, names and directions.
//!
//! ## Example
//!
//! ```rust
//! use evotune::evolution::{GeneSpec, ObjectiveSpec, OptimizerOptions};
//! use evotune::log_format::{format_individual, parse_individual};
//!
//! let options = OptimizerOptions::builder()
//!     .objective(ObjectiveSpec::new(0, "error", true))
//!     .gene(GeneSpec::binary_vector("mask", 4))
//!     .gene(GeneSpec::integer_scalar("window", 1, 64))
//!     .build()
//!     .unwrap();
//!
//! let individual = parse_individual("1010,32,0.125", &options).unwrap();
//! assert_eq!(individual.primary_value(), Some(0.125));
//! assert_eq!(format_individual(&individual), "1010,32,0.125");
//! ```

use std::io::{BufRead, Write};

use tracing::debug;

use crate::{
    error::{OptimizerError, Result},
    evolution::{ObjectiveSpec, OptimizerOptions},
    individual::{Fitness, Gene, Individual, Objective},
};

const SEPARATOR: char = ',';

/// Renders one individual as a log line, without a trailing newline.
pub fn format_individual(individual: &Individual) -> String {
    let genes = individual.genome().iter().map(|gene| gene.value.to_string());
    let training = individual
        .training_fitness()
        .iter()
        .map(|objective| objective.value.to_string());
    let test = individual
        .test_fitness()
        .unwrap_or(&[])
        .iter()
        .map(|objective| objective.value.to_string());

    genes
        .chain(training)
        .chain(test)
        .collect::<Vec<String>>()
        .join(&SEPARATOR.to_string())
}

fn parse_objectives(fields: &[&str], specs: &[ObjectiveSpec]) -> Result<Vec<Objective>> {
    fields
        .iter()
        .zip(specs)
        .map(|(field, spec)| {
            field
                .trim()
                .parse::<f64>()
                .map(|value| spec.measure(value))
                .map_err(|e| {
                    OptimizerError::Parse(format!("objective '{}' = '{}': {}", spec.name, field, e))
                })
        })
        .collect()
}

/// Rebuilds an individual from a log line.
///
/// # Errors
///
/// `Parse` if the field count is wrong or a value cannot be read, `ShapeMismatch`
/// if a gene string does not fit its configured shape.
pub fn parse_individual(line: &str, options: &OptimizerOptions) -> Result<Individual> {
    let genes = options.get_genes();
    let objectives = options.get_objectives();
    let fitness_sets = if options.uses_independent_test_set() { 2 } else { 1 };
    let expected = genes.len() + objectives.len() * fitness_sets;

    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(SEPARATOR).collect();
    if fields.len() != expected {
        return Err(OptimizerError::Parse(format!(
            "expected {} fields, got {} in '{}'",
            expected,
            fields.len(),
            line
        )));
    }
    let (gene_fields, value_fields) = fields.split_at(genes.len());

    let genome = genes
        .iter()
        .zip(gene_fields)
        .map(|(spec, field)| Ok(Gene::new(spec.name(), spec.parse(field)?)))
        .collect::<Result<Vec<Gene>>>()?;

    let (training_fields, test_fields) = value_fields.split_at(objectives.len());
    let training = parse_objectives(training_fields, objectives)?;
    let fitness = if options.uses_independent_test_set() {
        Fitness::with_test(training, parse_objectives(test_fields, objectives)?)
    } else {
        Fitness::training(training)
    };

    Ok(Individual::with_fitness(genome, fitness))
}

/// Writes one line per individual.
pub fn write_population<'a, W, I>(writer: &mut W, individuals: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Individual>,
{
    let mut written = 0;
    for individual in individuals {
        writeln!(writer, "{}", format_individual(individual))?;
        written += 1;
    }
    debug!(individuals = written, "Wrote population");
    Ok(written)
}

/// Reads every non-empty line back into an individual.
///
/// # Errors
///
/// A line that fails to parse aborts the read; the error is attributed to the
/// zero-based line number.
pub fn read_population<R: BufRead>(reader: R, options: &OptimizerOptions) -> Result<Vec<Individual>> {
    let mut individuals = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let individual = parse_individual(&line, options)
            .map_err(|e| e.in_operator("read_population", vec![line_number]))?;
        individuals.push(individual);
    }
    debug!(individuals = individuals.len(), "Read population");
    Ok(individuals)
}
