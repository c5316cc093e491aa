use tracing::debug;

use super::{clone_at, rank_by_first_objective, ReplacementStrategy};
use crate::{
    error::{OptimizerError, Result},
    population::Population,
};

/// (P, O) selection on the first objective.
///
/// Only the offspring compete; the `P` best by the first objective replace all
/// parents, so every survivor is new and the success count is `P`. Needs at least
/// as many offspring as parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommaSelection;

impl ReplacementStrategy for CommaSelection {
    fn name(&self) -> &'static str {
        "CommaSelection"
    }

    fn replace(&self, population: &mut Population) -> Result<usize> {
        let parent_size = population.parent_size();
        if population.offspring_size() < parent_size {
            return Err(OptimizerError::ShapeMismatch(format!(
                "{} offspring cannot replace {} parents",
                population.offspring_size(),
                parent_size
            ))
            .in_operator(self.name(), (parent_size..population.combined_len()).collect()));
        }
        population.check_objectives_for(self.name())?;

        let mut ranked: Vec<usize> = (parent_size..population.combined_len()).collect();
        rank_by_first_objective(population, &mut ranked);
        ranked.truncate(parent_size);
        debug!(strategy = self.name(), survivors = ?ranked, "Replaced parent population");

        let next = clone_at(population, &ranked);
        population.replace_parents(next)?;
        Ok(parent_size)
    }
}
