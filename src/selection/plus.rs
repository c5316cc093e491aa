use tracing::debug;

use super::{clone_at, rank_by_first_objective, ReplacementStrategy};
use crate::{error::Result, population::Population};

/// (P + O) selection on the first objective.
///
/// Parents and offspring compete together; the `P` best by the first objective
/// become the next parents, best first. Ties keep combined index order, so a
/// parent beats an equally good offspring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlusSelection;

impl ReplacementStrategy for PlusSelection {
    fn name(&self) -> &'static str {
        "PlusSelection"
    }

    fn replace(&self, population: &mut Population) -> Result<usize> {
        population.check_objectives_for(self.name())?;
        let parent_size = population.parent_size();

        let mut ranked: Vec<usize> = (0..population.combined_len()).collect();
        rank_by_first_objective(population, &mut ranked);
        ranked.truncate(parent_size);

        let success_count = ranked
            .iter()
            .filter(|&&index| population.is_offspring_index(index))
            .count();
        debug!(
            strategy = self.name(),
            survivors = ?ranked,
            success_count,
            "Replaced parent population"
        );

        let next = clone_at(population, &ranked);
        population.replace_parents(next)?;
        Ok(success_count)
    }
}
