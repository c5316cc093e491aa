//! # Selection
//!
//! Environmental selection: a replacement strategy consumes the combined
//! parent and offspring population of one generation, installs the next parent
//! population and reports how many offspring made it in (the success count).

pub mod comma;
pub mod hypervolume;
pub mod plus;

pub use comma::CommaSelection;
pub use hypervolume::{delta_s_contributions, HypervolumeSelection};
pub use plus::PlusSelection;

use std::fmt::Debug;

use crate::{
    error::Result,
    evolution::SelectionKind,
    individual::Individual,
    population::Population,
};

/// Trait for environmental selection strategies.
///
/// # Examples
///
/// ```
/// use evotune::individual::{Fitness, Gene, Individual, Objective};
/// use evotune::population::Population;
/// use evotune::representation::Representation;
/// use evotune::selection::{PlusSelection, ReplacementStrategy};
///
/// let individual = |error: f64| {
///     Individual::with_fitness(
///         vec![Gene::new("mask", Representation::BinaryVector(vec![true]))],
///         Fitness::training(vec![Objective::new(0, "error", error, true)]),
///     )
/// };
///
/// let mut population = Population::new(vec![individual(0.4), individual(0.2)]).unwrap();
/// population.set_offspring(vec![individual(0.1)]);
///
/// let successes = PlusSelection.replace(&mut population).unwrap();
/// assert_eq!(successes, 1);
/// assert_eq!(population.parents()[0].primary_value(), Some(0.1));
/// ```
pub trait ReplacementStrategy: Debug + Send + Sync {
    /// The name under which the strategy is configured and reported.
    fn name(&self) -> &'static str;

    /// Replaces the parent population of `population` and returns the success count.
    ///
    /// The parent population keeps its size. The offspring are left in place; the
    /// driver overwrites them with the next generation.
    ///
    /// # Errors
    ///
    /// Missing, empty or mismatched objective vectors are a `ShapeMismatch`, NaN
    /// values a `DegenerateOperand`; both are attributed to the strategy and the
    /// combined index of the offending individual. On error the population is unchanged.
    fn replace(&self, population: &mut Population) -> Result<usize>;
}

/// Builds the strategy for a configured selection kind.
pub fn from_kind(kind: SelectionKind) -> Box<dyn ReplacementStrategy> {
    match kind {
        SelectionKind::Plus => Box::new(PlusSelection),
        SelectionKind::Comma => Box::new(CommaSelection),
        SelectionKind::Hypervolume => Box::new(HypervolumeSelection),
    }
}

/// Stable ordering of `candidates` (combined indices) from best to worst first objective.
///
/// Ties keep their order in `candidates`.
pub(crate) fn rank_by_first_objective(population: &Population, candidates: &mut [usize]) {
    let first = |index: &usize| {
        population
            .get(*index)
            .and_then(|individual| individual.training_fitness().first())
            .map(|objective| (objective.value, objective.minimize))
    };
    candidates.sort_by(|a, b| match (first(a), first(b)) {
        (Some((va, true)), Some((vb, _))) => va.total_cmp(&vb),
        (Some((va, false)), Some((vb, _))) => vb.total_cmp(&va),
        _ => std::cmp::Ordering::Equal,
    });
}

/// Clones the individuals at `indices` (combined) in order.
pub(crate) fn clone_at(population: &Population, indices: &[usize]) -> Vec<Individual> {
    indices
        .iter()
        .filter_map(|&index| population.get(index).cloned())
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::individual::{Fitness, Gene, Individual, Objective};
    use crate::population::Population;
    use crate::representation::Representation;

    /// An individual whose genome records `tag` so survivors can be traced.
    pub fn tagged(tag: i64, objectives: &[(f64, bool)]) -> Individual {
        let training = objectives
            .iter()
            .enumerate()
            .map(|(k, &(value, minimize))| Objective::new(k, format!("o{}", k), value, minimize))
            .collect();
        Individual::with_fitness(
            vec![Gene::new("tag", Representation::IntegerVector(vec![tag]))],
            Fitness::training(training),
        )
    }

    pub fn tag_of(individual: &Individual) -> i64 {
        match individual.gene("tag") {
            Some(Representation::IntegerVector(values)) => values[0],
            _ => panic!("missing tag"),
        }
    }

    /// Parents tagged `0..`, offspring tagged from `parents.len()` on.
    pub fn population(parents: &[&[(f64, bool)]], offspring: &[&[(f64, bool)]]) -> Population {
        let p = parents.len() as i64;
        let mut population = Population::new(
            parents
                .iter()
                .enumerate()
                .map(|(i, o)| tagged(i as i64, o))
                .collect(),
        )
        .unwrap();
        population.set_offspring(
            offspring
                .iter()
                .enumerate()
                .map(|(i, o)| tagged(p + i as i64, o))
                .collect(),
        );
        population
    }

    pub fn parent_tags(population: &Population) -> Vec<i64> {
        population.parents().iter().map(tag_of).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_from_kind() {
        assert_eq!(from_kind(SelectionKind::Plus).name(), "PlusSelection");
        assert_eq!(from_kind(SelectionKind::Comma).name(), "CommaSelection");
        assert_eq!(from_kind(SelectionKind::Hypervolume).name(), "HypervolumeSelection");
    }

    #[test]
    fn test_rank_is_stable_and_directed() {
        let population = population(
            &[&[(2.0, false)], &[(5.0, false)], &[(2.0, false)]],
            &[&[(5.0, false)]],
        );
        let mut candidates = vec![0, 1, 2, 3];
        rank_by_first_objective(&population, &mut candidates);
        assert_eq!(candidates, vec![1, 3, 0, 2]);
    }
}
