//! # Dominance
//!
//! Pareto dominance between objective vectors with per-objective directions, and
//! the fast non-dominated sorting (Deb et al., 2002) of a combined population.
//!
//! Nothing here is cached: the relation is evaluated from scratch over the whole
//! combined population every time it is needed.
//!
//! ## Example
//!
//! ```rust
//! use evotune::dominance::fast_non_dominated_sort;
//! use evotune::individual::Objective;
//!
//! let point = |error: f64, size: f64| {
//!     vec![
//!         Objective::new(0, "error", error, true),
//!         Objective::new(1, "size", size, true),
//!     ]
//! };
//! let population = vec![point(1.0, 5.0), point(3.0, 3.0), point(5.0, 1.0), point(4.0, 4.0)];
//! let vectors: Vec<&[Objective]> = population.iter().map(|v| v.as_slice()).collect();
//!
//! let result = fast_non_dominated_sort(&vectors).unwrap();
//! assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3]]);
//! ```

use crate::{
    error::{OptimizerError, Result},
    individual::Objective,
    population::check_objective_vectors,
};

/// Outcome of comparing two objective vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compares two objective vectors of equal shape.
///
/// Ids, directions and lengths are assumed to have been checked by the caller.
pub fn compare(a: &[Objective], b: &[Objective]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (oa, ob) in a.iter().zip(b.iter()) {
        if oa.is_better_than(ob) {
            a_better_in_some = true;
        } else if ob.is_better_than(oa) {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Whether `a` dominates `b`: not worse on any objective and strictly better on at least one.
///
/// # Errors
///
/// `ShapeMismatch` for vectors of different length, ids or directions, or empty vectors.
/// `DegenerateOperand` if either vector holds a NaN.
pub fn dominates(a: &[Objective], b: &[Objective]) -> Result<bool> {
    check_objective_vectors(&[a, b])?;
    Ok(compare(a, b) == Dominance::Left)
}

/// Result of non-dominated sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NondominatedSortResult {
    /// Pareto rank of each individual (0 = first front).
    pub ranks: Vec<usize>,
    /// Indices grouped by front; `fronts[0]` holds every non-dominated index.
    pub fronts: Vec<Vec<usize>>,
}

impl NondominatedSortResult {
    /// The last, i.e. worst, front.
    pub fn worst_front(&self) -> &[usize] {
        self.fronts.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Partitions the objective vectors into Pareto fronts.
///
/// Every pair is compared once, so the cost is `O(m * n²)` for `n` vectors of `m`
/// objectives. Indices inside a front are in ascending order for the first front
/// and in discovery order for later fronts.
///
/// # Errors
///
/// `EmptyPopulation` for no vectors, otherwise the same errors as [`dominates`].
pub fn fast_non_dominated_sort(objectives: &[&[Objective]]) -> Result<NondominatedSortResult> {
    check_objective_vectors(objectives)?;
    let n = objectives.len();

    let mut domination_count = vec![0usize; n];
    let mut dominates_set: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            match compare(objectives[i], objectives[j]) {
                Dominance::Left => {
                    dominates_set[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominates_set[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
    }

    let first: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    if first.is_empty() {
        return Err(OptimizerError::DegenerateOperand(
            "no non-dominated individual found".to_string(),
        ));
    }

    let mut fronts = vec![first];
    loop {
        let mut next_front = Vec::new();
        if let Some(current) = fronts.last() {
            for &i in current {
                for &j in &dominates_set[i] {
                    domination_count[j] -= 1;
                    if domination_count[j] == 0 {
                        ranks[j] = fronts.len();
                        next_front.push(j);
                    }
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        fronts.push(next_front);
    }

    Ok(NondominatedSortResult { ranks, fronts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn minimized(values: &[f64]) -> Vec<Objective> {
        values
            .iter()
            .enumerate()
            .map(|(k, &v)| Objective::new(k, format!("o{}", k), v, true))
            .collect()
    }

    fn as_slices(vectors: &[Vec<Objective>]) -> Vec<&[Objective]> {
        vectors.iter().map(|v| v.as_slice()).collect()
    }

    #[test]
    fn test_dominates_respects_direction() {
        let a = vec![
            Objective::new(0, "error", 0.1, true),
            Objective::new(1, "accuracy", 0.9, false),
        ];
        let b = vec![
            Objective::new(0, "error", 0.2, true),
            Objective::new(1, "accuracy", 0.8, false),
        ];
        assert!(dominates(&a, &b).unwrap());
        assert!(!dominates(&b, &a).unwrap());
        assert!(!dominates(&a, &a).unwrap());
    }

    #[test]
    fn test_equal_vectors_do_not_dominate() {
        let a = minimized(&[1.0, 2.0]);
        let b = minimized(&[1.0, 2.0]);
        assert_eq!(compare(&a, &b), Dominance::Neither);
    }

    #[test]
    fn test_dominates_rejects_mismatch() {
        let a = minimized(&[1.0, 2.0]);
        let b = minimized(&[1.0]);
        assert!(matches!(
            dominates(&a, &b),
            Err(OptimizerError::ShapeMismatch(_))
        ));

        let mut flipped = minimized(&[1.0, 2.0]);
        flipped[1].minimize = false;
        assert!(matches!(
            dominates(&a, &flipped),
            Err(OptimizerError::ShapeMismatch(_))
        ));

        let nan = minimized(&[f64::NAN, 2.0]);
        assert!(matches!(
            dominates(&a, &nan),
            Err(OptimizerError::DegenerateOperand(_))
        ));
    }

    #[test]
    fn test_sort_layers() {
        let vectors = vec![
            minimized(&[1.0, 5.0]),
            minimized(&[3.0, 3.0]),
            minimized(&[5.0, 1.0]),
            minimized(&[4.0, 4.0]),
            minimized(&[6.0, 6.0]),
        ];
        let result = fast_non_dominated_sort(&as_slices(&vectors)).unwrap();
        assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3], vec![4]]);
        assert_eq!(result.ranks, vec![0, 0, 0, 1, 2]);
        assert_eq!(result.worst_front(), &[4]);
    }

    #[test]
    fn test_sort_single_and_duplicates() {
        let single = vec![minimized(&[1.0, 1.0])];
        let result = fast_non_dominated_sort(&as_slices(&single)).unwrap();
        assert_eq!(result.fronts, vec![vec![0]]);

        let duplicates = vec![minimized(&[2.0, 2.0]), minimized(&[2.0, 2.0])];
        let result = fast_non_dominated_sort(&as_slices(&duplicates)).unwrap();
        assert_eq!(result.fronts, vec![vec![0, 1]]);
    }

    #[test]
    fn test_sort_empty() {
        assert!(matches!(
            fast_non_dominated_sort(&[]),
            Err(OptimizerError::EmptyPopulation)
        ));
    }

    fn population() -> impl Strategy<Value = Vec<Vec<Objective>>> {
        prop::collection::vec(prop::collection::vec(0i32..6, 2), 1..24).prop_map(|rows| {
            rows.into_iter()
                .map(|row| minimized(&row.iter().map(|&v| v as f64).collect::<Vec<_>>()))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_dominance_is_strict_partial_order(vectors in population()) {
            let n = vectors.len();
            for i in 0..n {
                prop_assert_eq!(compare(&vectors[i], &vectors[i]), Dominance::Neither);
                for j in 0..n {
                    let ij = compare(&vectors[i], &vectors[j]) == Dominance::Left;
                    let ji = compare(&vectors[j], &vectors[i]) == Dominance::Left;
                    prop_assert!(!(ij && ji));
                    for k in 0..n {
                        let jk = compare(&vectors[j], &vectors[k]) == Dominance::Left;
                        if ij && jk {
                            prop_assert_eq!(compare(&vectors[i], &vectors[k]), Dominance::Left);
                        }
                    }
                }
            }
        }

        #[test]
        fn prop_sort_partitions_population(vectors in population()) {
            let result = fast_non_dominated_sort(&as_slices(&vectors)).unwrap();

            let mut seen: Vec<usize> = result.fronts.iter().flatten().copied().collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..vectors.len()).collect::<Vec<_>>());
            prop_assert!(result.fronts.iter().all(|front| !front.is_empty()));

            for (rank, front) in result.fronts.iter().enumerate() {
                for &i in front {
                    prop_assert_eq!(result.ranks[i], rank);
                    for earlier in &result.fronts[..rank] {
                        for &j in earlier {
                            prop_assert_ne!(compare(&vectors[i], &vectors[j]), Dominance::Left);
                        }
                    }
                    for &j in front {
                        prop_assert_eq!(compare(&vectors[i], &vectors[j]), Dominance::Neither);
                    }
                }
            }
        }
    }
}
