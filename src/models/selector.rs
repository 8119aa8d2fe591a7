//! Parent selection strategies for the path-finding genetic algorithm.
//!
//! All strategies operate on a population sorted ascending by fitness (index 0
//! is the best chromosome) and return an index into it. Lower fitness is
//! better throughout.
//!
//! # Selection Methods
//!
//! ## Tournament Selection
//!
//! Draws `min(k, n)` distinct candidates uniformly without replacement and
//! returns the one with the lowest fitness. The tournament size tunes the
//! selection pressure:
//! - **Size 2-3**: Balanced exploration and exploitation
//! - **Size 4-5**: Moderate selection pressure for steady convergence
//! - **Size 6+**: High pressure for rapid convergence (risk of premature convergence)
//!
//! ## Roulette Wheel Selection
//!
//! Each candidate is weighted `max_fitness - fitness + 1`, so the worst
//! candidate still keeps weight one. If any candidate is unreachable the
//! weights are meaningless and the wheel degrades to a uniform pick.
//!
//! ## Rank Selection
//!
//! Weights depend on position only: the best of `n` candidates weighs `n`,
//! the worst weighs `1`. Insensitive to the fitness scale.
//!
//! # Examples
//!
//! ```rust
//! use evolab::models::{SelectionMethod, Selector};
//!
//! let tournament = Selector::tournament(3)?;
//! let roulette = Selector::new(SelectionMethod::Roulette, 3)?;
//! let rank = Selector::new(SelectionMethod::Rank, 3)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::models::Chromosome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

/// Performs a single roulette wheel spin to select a candidate index.
///
/// Falls through to the last index if rounding leaves the spin beyond the
/// cumulative sum.
fn spin_roulette<R: Rng>(weights: &[f64], total_weight: f64, rng: &mut R) -> usize {
    let spin = rng.random::<f64>() * total_weight;
    let mut cumulative = 0.0;

    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative >= spin {
            return index;
        }
    }

    weights.len().saturating_sub(1)
}

/// Returns the index of the fittest among `min(tournament_size, n)` distinct
/// random candidates. Ties go to the earliest drawn candidate.
#[instrument(level = "debug", skip(chromosomes, rng), fields(tournament_size = tournament_size, num_candidates = chromosomes.len()))]
fn tournament_selection<R: Rng>(
    chromosomes: &[Chromosome],
    tournament_size: usize,
    rng: &mut R,
) -> Option<usize> {
    let amount = tournament_size.min(chromosomes.len());
    let mut contestants = rand::seq::index::sample(rng, chromosomes.len(), amount).into_iter();

    let mut winner = contestants.next()?;
    for index in contestants {
        if chromosomes[index].fitness() < chromosomes[winner].fitness() {
            winner = index;
        }
    }

    Some(winner)
}

/// Fitness-proportionate selection inverted for minimisation.
#[instrument(level = "debug", skip(chromosomes, rng), fields(num_candidates = chromosomes.len()))]
fn roulette_selection<R: Rng>(chromosomes: &[Chromosome], rng: &mut R) -> Option<usize> {
    if chromosomes.is_empty() {
        return None;
    }

    let fitness: Option<Vec<f64>> = chromosomes.iter().map(|c| c.fitness().value()).collect();
    let Some(fitness) = fitness else {
        // An unreachable member makes every weight infinite
        return Some(rng.random_range(0..chromosomes.len()));
    };

    let max_fitness = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = fitness.iter().map(|f| max_fitness - f + 1.0).collect();
    let total_weight: f64 = weights.iter().sum();

    if total_weight <= 0.0 {
        return Some(rng.random_range(0..chromosomes.len()));
    }

    Some(spin_roulette(&weights, total_weight, rng))
}

/// Linear rank selection: weight `n - rank`, rank 0 being the best.
#[instrument(level = "debug", skip(chromosomes, rng), fields(num_candidates = chromosomes.len()))]
fn rank_selection<R: Rng>(chromosomes: &[Chromosome], rng: &mut R) -> Option<usize> {
    if chromosomes.is_empty() {
        return None;
    }

    let n = chromosomes.len();
    let weights: Vec<f64> = (0..n).map(|rank| (n - rank) as f64).collect();
    let total_weight: f64 = weights.iter().sum();

    Some(spin_roulette(&weights, total_weight, rng))
}

/// Selection algorithms available for parent selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    #[default]
    Tournament,
    Roulette,
    Rank,
}

impl SelectionMethod {
    pub const ALL: [SelectionMethod; 3] = [
        SelectionMethod::Tournament,
        SelectionMethod::Roulette,
        SelectionMethod::Rank,
    ];
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tournament => "tournament",
            Self::Roulette => "roulette",
            Self::Rank => "rank",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when configuring parent selection.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum SelectionError {
    /// Tournaments need at least one contestant.
    #[error("Tournament size must be at least 1")]
    EmptyTournament,
}

/// Configuration for parent selection.
///
/// The tournament size is carried for every method so that switching the
/// method never loses it; only tournament selection reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    pub method: SelectionMethod,
    pub tournament_size: usize,
}

impl Selector {
    pub fn new(method: SelectionMethod, tournament_size: usize) -> Result<Self, SelectionError> {
        if tournament_size == 0 {
            return Err(SelectionError::EmptyTournament);
        }

        Ok(Self {
            method,
            tournament_size,
        })
    }

    pub fn tournament(tournament_size: usize) -> Result<Self, SelectionError> {
        Self::new(SelectionMethod::Tournament, tournament_size)
    }

    /// Selects one parent index from chromosomes sorted ascending by fitness.
    ///
    /// Returns `None` only for an empty slice.
    #[instrument(level = "debug", skip(self, chromosomes, rng), fields(method = ?self.method, num_candidates = chromosomes.len()))]
    pub(crate) fn select<R: Rng>(&self, chromosomes: &[Chromosome], rng: &mut R) -> Option<usize> {
        match self.method {
            SelectionMethod::Tournament => {
                tournament_selection(chromosomes, self.tournament_size, rng)
            }
            SelectionMethod::Roulette => roulette_selection(chromosomes, rng),
            SelectionMethod::Rank => rank_selection(chromosomes, rng),
        }
    }
}
