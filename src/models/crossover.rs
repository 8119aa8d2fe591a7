use crate::models::Node;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Performs uniform crossover, swapping each shared position between the children
/// with probability one half. Tails beyond the shorter parent stay with their
/// own parent's child.
#[instrument(level = "debug", skip(rng, lhs, rhs), fields(lhs_length = lhs.len(), rhs_length = rhs.len()))]
fn crossover_uniform<R: Rng>(rng: &mut R, lhs: &[Node], rhs: &[Node]) -> (Vec<Node>, Vec<Node>) {
    let min_length = lhs.len().min(rhs.len());
    let mut first = Vec::with_capacity(lhs.len());
    let mut second = Vec::with_capacity(rhs.len());

    for (&a, &b) in lhs.iter().zip(rhs.iter()) {
        if rng.random_bool(0.5) {
            first.push(a);
            second.push(b);
        } else {
            first.push(b);
            second.push(a);
        }
    }

    first.extend_from_slice(&lhs[min_length..]);
    second.extend_from_slice(&rhs[min_length..]);

    (first, second)
}

/// Performs single-point crossover at the specified cut point.
#[instrument(level = "debug", skip(lhs, rhs), fields(lhs_length = lhs.len(), rhs_length = rhs.len(), cut_point = point))]
fn crossover_one_point(lhs: &[Node], rhs: &[Node], point: usize) -> (Vec<Node>, Vec<Node>) {
    let first = [&lhs[..point], &rhs[point..]].concat();
    let second = [&rhs[..point], &lhs[point..]].concat();

    (first, second)
}

/// Swaps the segment `[start, end)` between the parents.
#[instrument(level = "debug", skip(lhs, rhs), fields(lhs_length = lhs.len(), rhs_length = rhs.len(), start = start, end = end))]
fn crossover_two_point(
    lhs: &[Node],
    rhs: &[Node],
    start: usize,
    end: usize,
) -> (Vec<Node>, Vec<Node>) {
    let first = [&lhs[..start], &rhs[start..end], &lhs[end..]].concat();
    let second = [&rhs[..start], &lhs[start..end], &rhs[end..]].concat();

    (first, second)
}

/// Crossover strategy for combining two paths into two children.
///
/// Paths have variable length, so every strategy works positionally over the
/// shorter parent. None of them preserves path validity: the caller forces the
/// endpoints afterwards and relies on repair and fitness to weed out broken
/// children.
///
/// ## Uniform
/// Each shared position is swapped between the children with probability 0.5.
///
/// ## One-point
/// A single cut in `1..min_length` and the tails are exchanged. Falls back to
/// uniform when the shorter parent has two genes or fewer.
///
/// ## Two-point
/// Two cuts `start < end` inside the shorter parent and the middle segment is
/// exchanged. Falls back to uniform when the shorter parent has three genes or
/// fewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverMethod {
    #[default]
    Uniform,
    OnePoint,
    TwoPoint,
}

impl CrossoverMethod {
    pub const ALL: [CrossoverMethod; 3] = [
        CrossoverMethod::Uniform,
        CrossoverMethod::OnePoint,
        CrossoverMethod::TwoPoint,
    ];

    /// Applies the crossover to two gene sequences, producing two children.
    #[instrument(level = "debug", skip(self, rng, lhs, rhs), fields(crossover_method = ?self, lhs_length = lhs.len(), rhs_length = rhs.len()))]
    pub(crate) fn apply<R: Rng>(
        &self,
        rng: &mut R,
        lhs: &[Node],
        rhs: &[Node],
    ) -> (Vec<Node>, Vec<Node>) {
        let min_length = lhs.len().min(rhs.len());

        match self {
            Self::OnePoint if min_length > 2 => {
                let point = rng.random_range(1..min_length);
                crossover_one_point(lhs, rhs, point)
            }
            Self::TwoPoint if min_length > 3 => {
                let start = rng.random_range(1..min_length - 1);
                let end = rng.random_range(start + 1..min_length);
                crossover_two_point(lhs, rhs, start, end)
            }
            _ => crossover_uniform(rng, lhs, rhs),
        }
    }
}

impl fmt::Display for CrossoverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uniform => "uniform",
            Self::OnePoint => "one_point",
            Self::TwoPoint => "two_point",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn it_performs_uniform_crossover() {
        let mut rng = StdRng::seed_from_u64(42);
        let lhs = vec![1, 2, 3, 4, 5];
        let rhs = vec![6, 7, 8, 9, 10];

        let (first, second) = crossover_uniform(&mut rng, &lhs, &rhs);

        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 5);

        // Every position holds one gene of each parent, split between the children
        for i in 0..5 {
            let mut pair = [first[i], second[i]];
            pair.sort();
            assert_eq!(pair, [lhs[i], rhs[i]]);
        }
    }

    #[test]
    fn it_keeps_tails_with_their_parent_in_uniform_crossover() {
        let mut rng = StdRng::seed_from_u64(42);
        let lhs = vec![1, 2, 3, 4, 5];
        let rhs = vec![6, 7];

        let (first, second) = crossover_uniform(&mut rng, &lhs, &rhs);

        assert_eq!(first.len(), 5);
        assert_eq!(&first[2..], &[3, 4, 5]);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn it_performs_one_point_crossover() {
        let lhs = vec![1, 2, 3, 4, 5];
        let rhs = vec![6, 7, 8, 9, 10];

        assert_eq!(
            crossover_one_point(&lhs, &rhs, 1),
            (vec![1, 7, 8, 9, 10], vec![6, 2, 3, 4, 5])
        );
        assert_eq!(
            crossover_one_point(&lhs, &rhs, 3),
            (vec![1, 2, 3, 9, 10], vec![6, 7, 8, 4, 5])
        );
    }

    #[test]
    fn it_performs_one_point_crossover_on_unequal_lengths() {
        let lhs = vec![1, 2, 3, 4, 5, 11];
        let rhs = vec![6, 7, 8];

        assert_eq!(
            crossover_one_point(&lhs, &rhs, 2),
            (vec![1, 2, 8], vec![6, 7, 3, 4, 5, 11])
        );
    }

    #[test]
    fn it_performs_two_point_crossover() {
        let lhs = vec![1, 2, 3, 4, 5];
        let rhs = vec![6, 7, 8, 9, 10];

        assert_eq!(
            crossover_two_point(&lhs, &rhs, 1, 3),
            (vec![1, 7, 8, 4, 5], vec![6, 2, 3, 9, 10])
        );
    }

    #[test]
    fn it_keeps_cut_points_inside_the_shorter_parent() {
        let mut rng = StdRng::seed_from_u64(3);
        let lhs = vec![0, 1, 2, 3, 9];
        let rhs = vec![0, 5, 6, 7, 8, 4, 9];

        for method in CrossoverMethod::ALL {
            for _ in 0..200 {
                let (first, second) = method.apply(&mut rng, &lhs, &rhs);
                assert_eq!(first.len() + second.len(), lhs.len() + rhs.len());
            }
        }
    }

    #[test]
    fn it_falls_back_to_uniform_for_short_parents() {
        let lhs = vec![0, 9];
        let rhs = vec![0, 1, 9];

        // Both fall back because the shorter parent has only two genes
        for method in [CrossoverMethod::OnePoint, CrossoverMethod::TwoPoint] {
            let mut fallback_rng = StdRng::seed_from_u64(11);
            let mut uniform_rng = StdRng::seed_from_u64(11);

            assert_eq!(
                method.apply(&mut fallback_rng, &lhs, &rhs),
                crossover_uniform(&mut uniform_rng, &lhs, &rhs)
            );
        }

        // Two-point also falls back at three genes
        let lhs = vec![0, 1, 9];
        let rhs = vec![0, 2, 3, 9];
        let mut fallback_rng = StdRng::seed_from_u64(5);
        let mut uniform_rng = StdRng::seed_from_u64(5);
        assert_eq!(
            CrossoverMethod::TwoPoint.apply(&mut fallback_rng, &lhs, &rhs),
            crossover_uniform(&mut uniform_rng, &lhs, &rhs)
        );
    }

    #[test]
    fn it_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&CrossoverMethod::TwoPoint).unwrap(),
            "\"two_point\""
        );
        assert_eq!(
            serde_json::from_str::<CrossoverMethod>("\"one_point\"").unwrap(),
            CrossoverMethod::OnePoint
        );
        assert_eq!(CrossoverMethod::OnePoint.to_string(), "one_point");
    }
}
