use tracing::debug;

use super::ReplacementStrategy;
use crate::{
    dominance::fast_non_dominated_sort,
    error::{OptimizerError, OptionExt, Result},
    individual::Objective,
    population::Population,
};

/// S-metric selection (SMS-EMOA) for two objectives.
///
/// The combined population is sorted into Pareto fronts. In the worst front the
/// individual with the smallest hypervolume contribution (delta-S) is the removal
/// candidate. If it is a parent, it is replaced by the first offspring; if it is an
/// offspring, the parents stay as they are. Only the first offspring is considered,
/// so the strategy is meant for `O = 1`.
///
/// Ties between equally small contributions go to the highest combined index,
/// which keeps parents over offspring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HypervolumeSelection;

/// Computes delta-S for the members of one front in a two-objective space.
///
/// `front` holds indices into `objectives`. The members are ordered by their first
/// objective value (stable, ascending); both ends get `+inf`. An interior member
/// `k` contributes `|f0[k+1] - f0[k]| * |f1[k-1] - f1[k]|`. The result is in that
/// order as `(index, contribution)` pairs.
///
/// Infinite objective values are allowed. Equal neighbours are `0` apart even when
/// both are infinite, and a zero side gives a zero contribution, so no NaN comes
/// out for any NaN-free input.
///
/// Only exact for two objectives; more objectives are a `ShapeMismatch`.
pub fn delta_s_contributions(
    front: &[usize],
    objectives: &[&[Objective]],
) -> Result<Vec<(usize, f64)>> {
    let values = front
        .iter()
        .map(|&index| match objectives.get(index) {
            Some([first, second]) => Ok((index, first.value, second.value)),
            Some(other) => Err(OptimizerError::ShapeMismatch(format!(
                "delta-S needs exactly 2 objectives, individual {} has {}",
                index,
                other.len()
            ))),
            None => Err(OptimizerError::ShapeMismatch(format!(
                "front index {} out of range for {} individuals",
                index,
                objectives.len()
            ))),
        })
        .collect::<Result<Vec<(usize, f64, f64)>>>()?;

    let mut sorted = values;
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));

    let last = sorted.len().saturating_sub(1);
    Ok(sorted
        .iter()
        .enumerate()
        .map(|(k, &(index, f0, f1))| {
            if k == 0 || k == last {
                (index, f64::INFINITY)
            } else {
                let (_, next_f0, _) = sorted[k + 1];
                let (_, _, previous_f1) = sorted[k - 1];
                (index, area(distance(next_f0, f0), distance(previous_f1, f1)))
            }
        })
        .collect())
}

fn distance(a: f64, b: f64) -> f64 {
    if a == b {
        0.0
    } else {
        (a - b).abs()
    }
}

fn area(width: f64, height: f64) -> f64 {
    if width == 0.0 || height == 0.0 {
        0.0
    } else {
        width * height
    }
}

/// Picks the smallest contribution, preferring the highest index among ties.
fn removal_candidate(contributions: &[(usize, f64)]) -> Option<(usize, f64)> {
    contributions.iter().copied().fold(None, |best, (index, value)| match best {
        Some((best_index, best_value))
            if value.total_cmp(&best_value).then(best_index.cmp(&index)).is_gt() =>
        {
            Some((best_index, best_value))
        }
        _ => Some((index, value)),
    })
}

impl ReplacementStrategy for HypervolumeSelection {
    fn name(&self) -> &'static str {
        "HypervolumeSelection"
    }

    fn replace(&self, population: &mut Population) -> Result<usize> {
        let everyone: Vec<usize> = (0..population.combined_len()).collect();
        if population.offspring_size() == 0 {
            return Err(OptimizerError::ShapeMismatch(
                "no offspring to insert".to_string(),
            )
            .in_operator(self.name(), everyone));
        }
        let objective_count = population.check_objectives_for(self.name())?;
        if objective_count != 2 {
            return Err(OptimizerError::ShapeMismatch(format!(
                "hypervolume selection supports exactly 2 objectives, got {}",
                objective_count
            ))
            .in_operator(self.name(), everyone));
        }

        let objectives = population.training_objectives();
        let sorting = fast_non_dominated_sort(&objectives)
            .map_err(|e| e.in_operator(self.name(), everyone.clone()))?;
        let worst_front = sorting.worst_front();
        let contributions = delta_s_contributions(worst_front, &objectives)
            .map_err(|e| e.in_operator(self.name(), worst_front.to_vec()))?;
        let (candidate, contribution) = removal_candidate(&contributions).ok_or_else_optimizer(|| {
            OptimizerError::DegenerateOperand("worst front is empty".to_string())
                .in_operator(self.name(), everyone.clone())
        })?;
        debug!(
            strategy = self.name(),
            fronts = sorting.fronts.len(),
            worst_front = ?worst_front,
            candidate,
            contribution,
            "Selected removal candidate"
        );

        if population.is_offspring_index(candidate) {
            debug!(strategy = self.name(), success_count = 0, "Parent population unchanged");
            return Ok(0);
        }

        let newcomer = population.offspring()[0].clone();
        population.replace_parent(candidate, newcomer)?;
        debug!(
            strategy = self.name(),
            replaced = candidate,
            success_count = 1,
            "Replaced parent"
        );
        Ok(1)
    }
}
