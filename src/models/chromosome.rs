use crate::models::{Cost, CrossoverMethod, Graph, Node, Probability};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;

/// Fitness penalty added per gene so that shorter paths win ties on cost.
pub const LENGTH_PENALTY: f64 = 0.1;

/// A candidate path from sender to receiver.
///
/// Chromosomes are immutable: fitness and validity are computed against the
/// graph once, at construction, and every genetic operator returns new
/// instances.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Chromosome {
    genes: Vec<Node>,
    cost: Cost,
    fitness: Cost,
    is_valid: bool,
}

/// Overwrites the first and last genes with the graph endpoints.
fn force_endpoints(mut genes: Vec<Node>, graph: &Graph) -> Vec<Node> {
    if let Some(first) = genes.first_mut() {
        *first = graph.sender();
    }
    if let Some(last) = genes.last_mut() {
        *last = graph.receiver();
    }
    genes
}

impl Chromosome {
    pub fn new(genes: Vec<Node>, graph: &Graph) -> Self {
        let is_valid = graph.is_valid_path(&genes);
        let cost = if is_valid {
            graph.path_cost(&genes)
        } else {
            Cost::Unreachable
        };
        let fitness = cost + Cost::Finite(genes.len() as f64 * LENGTH_PENALTY);

        Self {
            genes,
            cost,
            fitness,
            is_valid,
        }
    }

    pub fn genes(&self) -> &[Node] {
        &self.genes
    }

    /// Path cost plus the length penalty, unreachable when the path is invalid.
    pub fn fitness(&self) -> Cost {
        self.fitness
    }

    /// Raw path cost without the length penalty.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Genes strictly between the first and the last one.
    pub fn interior(&self) -> &[Node] {
        if self.genes.len() > 2 {
            &self.genes[1..self.genes.len() - 1]
        } else {
            &[]
        }
    }

    /// With probability `rate`, replaces one random interior gene by a node that
    /// does not already appear on either side of it. The chromosome is returned
    /// unchanged when no such node exists.
    #[instrument(level = "debug", skip(self, graph, rng), fields(genome_length = self.genes.len(), rate = rate.get()))]
    pub fn mutate<R: Rng>(&self, graph: &Graph, rate: Probability, rng: &mut R) -> Chromosome {
        let mut genes = self.genes.clone();

        if genes.len() > 2 && rate.sample(rng) {
            let index = rng.random_range(1..genes.len() - 1);
            let used: HashSet<Node> = genes[..index]
                .iter()
                .chain(genes[index + 1..].iter())
                .copied()
                .collect();
            let available: Vec<Node> = (0..graph.size())
                .filter(|node| !used.contains(node))
                .collect();

            if let Some(&replacement) = available.choose(rng) {
                genes[index] = replacement;
            }
        }

        Chromosome::new(genes, graph)
    }

    /// Combines two parents into two children with the given method and forces
    /// both children to start at the sender and end at the receiver.
    ///
    /// The interior of a child may contain duplicates or broken edges;
    /// [`Chromosome::repair`] and the fitness function deal with that.
    #[instrument(level = "debug", skip(self, other, graph, rng), fields(method = ?method, lhs_length = self.genes.len(), rhs_length = other.genes.len()))]
    pub fn crossover<R: Rng>(
        &self,
        other: &Chromosome,
        method: CrossoverMethod,
        graph: &Graph,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        let (first, second) = method.apply(rng, &self.genes, &other.genes);

        (
            Chromosome::new(force_endpoints(first, graph), graph),
            Chromosome::new(force_endpoints(second, graph), graph),
        )
    }

    /// Drops repeated nodes, keeping the first occurrence, and makes sure the
    /// sequence starts at the sender and ends at the receiver.
    ///
    /// A leading sender and any later receiver survive deduplication. The
    /// result is duplicate-free and endpoint-correct, but not necessarily a
    /// connected path.
    #[instrument(level = "debug", skip(self, graph), fields(genome_length = self.genes.len()))]
    pub fn repair(&self, graph: &Graph) -> Chromosome {
        if self.genes.len() < 2 {
            return self.clone();
        }

        let sender = graph.sender();
        let receiver = graph.receiver();
        let mut seen = HashSet::with_capacity(self.genes.len());
        let mut genes = Vec::with_capacity(self.genes.len() + 2);

        for &gene in &self.genes {
            if seen.insert(gene) {
                genes.push(gene);
            } else if gene == sender && genes.is_empty() {
                genes.push(gene);
            } else if gene == receiver && !genes.is_empty() {
                genes.push(gene);
            }
        }

        if genes.first() != Some(&sender) {
            genes.insert(0, sender);
        }
        if genes.last() != Some(&receiver) {
            genes.push(receiver);
        }

        Chromosome::new(genes, graph)
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .genes
            .iter()
            .map(|gene| gene.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        write!(f, "Path: {path}, Cost: {:.2}", self.fitness)
    }
}
