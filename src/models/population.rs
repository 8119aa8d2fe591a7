use crate::models::{Chromosome, Cost, Graph, Node, Selector};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;

/// Random walks attempted before falling back to a fixed path.
const MAX_WALK_ATTEMPTS: usize = 200;

/// Fitness summary appended once per completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u32,
    pub best: Cost,
    pub average: Cost,
    pub worst: Cost,
}

/// Aggregate fitness of a population.
///
/// `avg` is unreachable as soon as one member is, and `std` is then undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStatistics {
    pub min: Cost,
    pub max: Cost,
    pub avg: Cost,
    pub std: Option<f64>,
}

/// One generation of candidate paths, kept sorted ascending by fitness.
#[derive(Debug, Clone, Serialize)]
pub struct Population {
    size: usize,
    chromosome_length: usize,
    chromosomes: Vec<Chromosome>,
    generation: u32,
    history: Vec<GenerationRecord>,
}

impl Population {
    /// Creates an empty population targeting `size` members.
    ///
    /// `chromosome_length` bounds the random walk together with the graph size
    /// and defaults to `max(graph.size - 2, 4)`.
    pub fn new(size: usize, graph: &Graph, chromosome_length: Option<usize>) -> Self {
        Self {
            size,
            chromosome_length: chromosome_length
                .unwrap_or_else(|| graph.size().saturating_sub(2).max(4)),
            chromosomes: Vec::with_capacity(size),
            generation: 0,
            history: Vec::new(),
        }
    }

    /// An empty population with the same target size, walk length and
    /// generation counter, used to assemble the next generation.
    pub(crate) fn offspring(&self) -> Self {
        Self {
            size: self.size,
            chromosome_length: self.chromosome_length,
            chromosomes: Vec::with_capacity(self.size + 1),
            generation: self.generation,
            history: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn chromosome_length(&self) -> usize {
        self.chromosome_length
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    pub(crate) fn push(&mut self, chromosome: Chromosome) {
        self.chromosomes.push(chromosome);
    }

    pub(crate) fn into_chromosomes(self) -> Vec<Chromosome> {
        self.chromosomes
    }

    /// Swaps in a new chromosome set without touching the generation counter
    /// or the history.
    pub(crate) fn replace_chromosomes(&mut self, chromosomes: Vec<Chromosome>) {
        self.chromosomes = chromosomes;
    }

    /// Replaces all members with `size` random walks and sorts them.
    #[instrument(level = "debug", skip(self, graph, rng), fields(size = self.size, chromosome_length = self.chromosome_length))]
    pub fn initialize_random<R: Rng>(&mut self, graph: &Graph, rng: &mut R) {
        let chromosomes = (0..self.size)
            .map(|_| self.random_chromosome(graph, rng))
            .collect();
        self.chromosomes = chromosomes;
        self.sort_by_fitness();
    }

    /// Generates one chromosome by constrained random walk.
    ///
    /// Never fails: after the retry budget it falls back to a direct edge, then
    /// to a single intermediate hop, then to a bare `[sender, receiver]` pair
    /// that may well be unreachable.
    pub(crate) fn random_chromosome<R: Rng>(&self, graph: &Graph, rng: &mut R) -> Chromosome {
        let max_steps = (graph.size() * 2).max(self.chromosome_length);

        for _ in 0..MAX_WALK_ATTEMPTS {
            if let Some(genes) = random_walk(graph, max_steps, rng) {
                return Chromosome::new(genes, graph);
            }
        }

        tracing::warn!(
            message = "Random walk budget exhausted, using fallback path",
            attempts = MAX_WALK_ATTEMPTS,
            sender = graph.sender(),
            receiver = graph.receiver()
        );
        fallback_chromosome(graph)
    }

    /// Stable sort, so equal-fitness members keep their relative order.
    fn sort_by_fitness(&mut self) {
        self.chromosomes.sort_by_key(|chromosome| chromosome.fitness());
    }

    pub fn best(&self) -> Option<&Chromosome> {
        self.chromosomes.first()
    }

    pub fn worst(&self) -> Option<&Chromosome> {
        self.chromosomes.last()
    }

    /// Mean fitness, unreachable for an empty population or when any member
    /// is unreachable.
    pub fn average_fitness(&self) -> Cost {
        if self.chromosomes.is_empty() {
            return Cost::Unreachable;
        }

        let total = self
            .chromosomes
            .iter()
            .fold(Cost::ZERO, |total, chromosome| total + chromosome.fitness());

        match total {
            Cost::Finite(total) => Cost::Finite(total / self.chromosomes.len() as f64),
            Cost::Unreachable => Cost::Unreachable,
        }
    }

    pub fn statistics(&self) -> FitnessStatistics {
        if self.chromosomes.is_empty() {
            return FitnessStatistics {
                min: Cost::Unreachable,
                max: Cost::Unreachable,
                avg: Cost::Unreachable,
                std: Some(0.0),
            };
        }

        let fitness: Vec<Cost> = self.chromosomes.iter().map(Chromosome::fitness).collect();
        let min = fitness.iter().copied().min().unwrap_or(Cost::Unreachable);
        let max = fitness.iter().copied().max().unwrap_or(Cost::Unreachable);
        let avg = self.average_fitness();

        let std = avg.value().and_then(|mean| {
            let values: Option<Vec<f64>> = fitness.iter().map(Cost::value).collect();
            let values = values?;
            let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>()
                / values.len() as f64;
            Some(variance.sqrt())
        });

        FitnessStatistics { min, max, avg, std }
    }

    /// Picks one parent according to `selector`.
    pub fn select<R: Rng>(&self, selector: &Selector, rng: &mut R) -> Option<&Chromosome> {
        selector
            .select(&self.chromosomes, rng)
            .map(|index| &self.chromosomes[index])
    }

    /// Keeps the first member of every distinct gene sequence.
    #[instrument(level = "debug", skip(self), fields(size = self.chromosomes.len()))]
    pub fn remove_duplicates(&mut self) {
        let mut seen: HashSet<Vec<Node>> = HashSet::with_capacity(self.chromosomes.len());
        self.chromosomes
            .retain(|chromosome| seen.insert(chromosome.genes().to_vec()));
    }

    /// Truncates to the target size or tops up with random walks, then sorts.
    ///
    /// Truncation happens before sorting and keeps the members in insertion
    /// order.
    #[instrument(level = "debug", skip(self, graph, rng), fields(current = self.chromosomes.len(), target = self.size))]
    pub fn maintain_size<R: Rng>(&mut self, graph: &Graph, rng: &mut R) {
        if self.chromosomes.len() > self.size {
            self.chromosomes.truncate(self.size);
        }
        while self.chromosomes.len() < self.size {
            let chromosome = self.random_chromosome(graph, rng);
            self.chromosomes.push(chromosome);
        }

        self.sort_by_fitness();
    }

    /// Advances the generation counter and records its fitness statistics.
    pub fn update_generation(&mut self) {
        self.generation += 1;

        let statistics = self.statistics();
        self.history.push(GenerationRecord {
            generation: self.generation,
            best: statistics.min,
            average: statistics.avg,
            worst: statistics.max,
        });
    }

    /// Mean pairwise Jaccard distance between the interior node sets.
    ///
    /// Pairs whose interiors are both empty are left out of the mean. Zero for
    /// fewer than two members or when no pair qualifies.
    #[instrument(level = "debug", skip(self), fields(size = self.chromosomes.len()))]
    pub fn diversity(&self) -> f64 {
        if self.chromosomes.len() <= 1 {
            return 0.0;
        }

        let interiors: Vec<HashSet<Node>> = self
            .chromosomes
            .iter()
            .map(|chromosome| chromosome.interior().iter().copied().collect())
            .collect();

        let mut total = 0.0;
        let mut comparisons = 0usize;

        for (i, lhs) in interiors.iter().enumerate() {
            for rhs in &interiors[i + 1..] {
                let union = lhs.union(rhs).count();
                if union == 0 {
                    continue;
                }
                let intersection = lhs.intersection(rhs).count();
                total += (union - intersection) as f64 / union as f64;
                comparisons += 1;
            }
        }

        if comparisons == 0 {
            0.0
        } else {
            total / comparisons as f64
        }
    }
}

/// Walks from the sender over uniformly chosen unvisited neighbours. The
/// receiver may always be stepped onto and ends the walk.
fn random_walk<R: Rng>(graph: &Graph, max_steps: usize, rng: &mut R) -> Option<Vec<Node>> {
    let sender = graph.sender();
    let receiver = graph.receiver();
    let mut path = vec![sender];
    let mut visited: HashSet<Node> = HashSet::from([sender]);
    let mut current = sender;
    let mut steps = 0;

    while current != receiver && steps < max_steps {
        let candidates: Vec<Node> = graph
            .neighbors(current)
            .filter(|&node| node == receiver || !visited.contains(&node))
            .collect();

        let &next = candidates.choose(rng)?;
        path.push(next);
        visited.insert(next);
        current = next;
        steps += 1;
    }

    (current == receiver).then_some(path)
}

fn fallback_chromosome(graph: &Graph) -> Chromosome {
    let sender = graph.sender();
    let receiver = graph.receiver();

    if graph.has_edge(sender, receiver) {
        return Chromosome::new(vec![sender, receiver], graph);
    }

    let intermediate = (0..graph.size())
        .filter(|&node| node != sender && node != receiver)
        .find(|&node| graph.has_edge(sender, node) && graph.has_edge(node, receiver));

    match intermediate {
        Some(node) => Chromosome::new(vec![sender, node, receiver], graph),
        None => Chromosome::new(vec![sender, receiver], graph),
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chromosomes.is_empty() {
            return write!(f, "Empty population");
        }

        let statistics = self.statistics();
        writeln!(
            f,
            "Population (generation {}, size {}):",
            self.generation,
            self.chromosomes.len()
        )?;
        writeln!(f, "Best fitness: {:.2}", statistics.min)?;
        writeln!(f, "Average fitness: {:.2}", statistics.avg)?;
        writeln!(f, "Worst fitness: {:.2}", statistics.max)?;
        writeln!(f, "Diversity: {:.3}", self.diversity())?;
        writeln!(f)?;

        for (rank, chromosome) in self.chromosomes.iter().take(5).enumerate() {
            writeln!(f, "{}. {}", rank + 1, chromosome)?;
        }

        Ok(())
    }
}
