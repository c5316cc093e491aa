//! # Population
//!
//! The parent population (fixed size `P`) and the offspring population of the
//! current generation. For the duration of one selection step the two are
//! addressed as one combined sequence: indices `0..P` are parents and
//! `P..P + O` are offspring.

use crate::{
    error::{OptimizerError, Result},
    individual::{Individual, Objective},
};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    parents: Vec<Individual>,
    offspring: Vec<Individual>,
}

impl Population {
    /// Creates a population from its parents; the parent count becomes the fixed size `P`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPopulation` if `parents` is empty.
    pub fn new(parents: Vec<Individual>) -> Result<Self> {
        if parents.is_empty() {
            return Err(OptimizerError::EmptyPopulation);
        }
        Ok(Self {
            parents,
            offspring: Vec::new(),
        })
    }

    /// Returns the parents, in combined indices `0..P`.
    pub fn parents(&self) -> &[Individual] {
        &self.parents
    }

    /// Returns the offspring, in combined indices `P..P + O`.
    pub fn offspring(&self) -> &[Individual] {
        &self.offspring
    }

    /// The fixed parent population size `P`.
    pub fn parent_size(&self) -> usize {
        self.parents.len()
    }

    pub fn offspring_size(&self) -> usize {
        self.offspring.len()
    }

    /// `P + O`.
    pub fn combined_len(&self) -> usize {
        self.parents.len() + self.offspring.len()
    }

    /// Installs the offspring of the current generation, dropping the previous ones.
    pub fn set_offspring(&mut self, offspring: Vec<Individual>) {
        self.offspring = offspring;
    }

    /// Looks up an individual by combined index.
    pub fn get(&self, index: usize) -> Option<&Individual> {
        if index < self.parents.len() {
            self.parents.get(index)
        } else {
            self.offspring.get(index - self.parents.len())
        }
    }

    pub fn is_offspring_index(&self, index: usize) -> bool {
        index >= self.parents.len()
    }

    /// Iterates `parents ++ offspring` in combined index order.
    pub fn combined(&self) -> impl Iterator<Item = &Individual> {
        self.parents.iter().chain(self.offspring.iter())
    }

    /// Training objective vectors of the combined population, in combined index order.
    pub fn training_objectives(&self) -> Vec<&[Objective]> {
        self.combined()
            .map(|individual| individual.training_fitness())
            .collect()
    }

    /// Replaces the whole parent population. The size `P` must be preserved.
    pub fn replace_parents(&mut self, parents: Vec<Individual>) -> Result<()> {
        if parents.len() != self.parents.len() {
            return Err(OptimizerError::ShapeMismatch(format!(
                "next parent population has {} individuals, expected {}",
                parents.len(),
                self.parents.len()
            )));
        }
        self.parents = parents;
        Ok(())
    }

    /// Replaces one parent in place.
    pub fn replace_parent(&mut self, index: usize, individual: Individual) -> Result<()> {
        let size = self.parents.len();
        let slot = self.parents.get_mut(index).ok_or_else(|| {
            OptimizerError::ShapeMismatch(format!(
                "parent index {} out of range for population of {}",
                index, size
            ))
        })?;
        *slot = individual;
        Ok(())
    }

    /// Checks that every individual of the combined population carries a training
    /// objective vector of the same length and directions, without NaN values.
    ///
    /// Returns the number of objectives.
    pub fn check_objectives(&self) -> Result<usize> {
        check_objective_vectors(&self.training_objectives())
    }

    /// Same as [`check_objectives`](Self::check_objectives), attributing a failure to
    /// `operator` and the combined index of the offending individual.
    pub fn check_objectives_for(&self, operator: &str) -> Result<usize> {
        inspect_objective_vectors(&self.training_objectives())
            .map_err(|(index, e)| e.in_operator(operator, vec![index]))
    }
}

/// Checks a set of objective vectors for use in a comparison.
///
/// Returns the number of objectives.
///
/// # Errors
///
/// - `EmptyPopulation` if there are no vectors.
/// - `ShapeMismatch` if a vector is empty or differs from the first in length, ids or directions.
/// - `DegenerateOperand` if a value is NaN.
pub fn check_objective_vectors(vectors: &[&[Objective]]) -> Result<usize> {
    inspect_objective_vectors(vectors).map_err(|(_, e)| e)
}

/// Like [`check_objective_vectors`], but also returns the index of the offending vector.
fn inspect_objective_vectors(
    vectors: &[&[Objective]],
) -> std::result::Result<usize, (usize, OptimizerError)> {
    let reference = vectors
        .first()
        .ok_or((0, OptimizerError::EmptyPopulation))?;
    if reference.is_empty() {
        return Err((
            0,
            OptimizerError::ShapeMismatch("individual 0 has no training objectives".to_string()),
        ));
    }

    for (index, vector) in vectors.iter().enumerate() {
        if vector.len() != reference.len() {
            return Err((
                index,
                OptimizerError::ShapeMismatch(format!(
                    "individual {} has {} objectives, individual 0 has {}",
                    index,
                    vector.len(),
                    reference.len()
                )),
            ));
        }
        for (k, (objective, first)) in vector.iter().zip(reference.iter()).enumerate() {
            if objective.id != first.id || objective.minimize != first.minimize {
                return Err((
                    index,
                    OptimizerError::ShapeMismatch(format!(
                        "objective {} of individual {} ('{}') does not match individual 0 ('{}')",
                        k, index, objective.name, first.name
                    )),
                ));
            }
            if objective.value.is_nan() {
                return Err((
                    index,
                    OptimizerError::DegenerateOperand(format!(
                        "objective '{}' of individual {} is NaN",
                        objective.name, index
                    )),
                ));
            }
        }
    }
    Ok(reference.len())
}
