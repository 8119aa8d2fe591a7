//! Dense weighted graph with a fixed sender and receiver.
//!
//! The graph is the search space of the path-finding genetic algorithm and also
//! provides the exact reference solution through Dijkstra's algorithm. Weights
//! are stored in an owned `size × size` matrix indexed by node id; a missing
//! edge is [`Cost::Unreachable`] and the diagonal is always zero.
//!
//! # Examples
//!
//! ```rust
//! use evolab::models::{Cost, Graph};
//!
//! let mut graph = Graph::new(4, 0, 3)?;
//! graph.connect(0, 1, 2.0);
//! graph.connect(1, 3, 2.0);
//! graph.connect(0, 3, 10.0);
//!
//! let (path, cost) = graph.shortest_path();
//! assert_eq!(path, vec![0, 1, 3]);
//! assert_eq!(cost, Cost::Finite(4.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::models::{Cost, Probability};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;

/// Node index inside a [`Graph`].
pub type Node = usize;

/// Upper bound on the dense matrix dimension accepted by [`Graph::new`].
pub const MAX_GRAPH_SIZE: usize = 64;

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum GraphError {
    #[error("InvalidSize: size must be between 2 and {max}, got {size}")]
    InvalidSize { size: usize, max: usize },
    #[error("NodeOutOfRange: node {node} is outside 0..{size}")]
    NodeOutOfRange { node: Node, size: usize },
    #[error("SameEndpoints: sender and receiver are both {node}")]
    SameEndpoints { node: Node },
    #[error("InvalidMaxWeight: max_weight must be at least 1, got {max_weight}")]
    InvalidMaxWeight { max_weight: u32 },
    #[error("InvalidWeight: edge weight must be finite and non-negative, got {weight}")]
    InvalidWeight { weight: f64 },
}

/// Weighted adjacency model between a sender and a receiver node.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Graph {
    size: usize,
    sender: Node,
    receiver: Node,
    weights: Vec<Cost>,
}

impl Graph {
    /// Creates a graph without edges.
    #[instrument(level = "debug")]
    pub fn new(size: usize, sender: Node, receiver: Node) -> Result<Self, GraphError> {
        if !(2..=MAX_GRAPH_SIZE).contains(&size) {
            return Err(GraphError::InvalidSize {
                size,
                max: MAX_GRAPH_SIZE,
            });
        }
        for node in [sender, receiver] {
            if node >= size {
                return Err(GraphError::NodeOutOfRange { node, size });
            }
        }
        if sender == receiver {
            return Err(GraphError::SameEndpoints { node: sender });
        }

        let mut weights = vec![Cost::Unreachable; size * size];
        for i in 0..size {
            weights[i * size + i] = Cost::ZERO;
        }

        Ok(Self {
            size,
            sender,
            receiver,
            weights,
        })
    }

    /// Creates a graph whose sender is node 0 and receiver is the last node.
    pub fn with_default_endpoints(size: usize) -> Result<Self, GraphError> {
        Self::new(size, 0, size.saturating_sub(1))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sender(&self) -> Node {
        self.sender
    }

    pub fn receiver(&self) -> Node {
        self.receiver
    }

    fn contains(&self, node: Node) -> bool {
        node < self.size
    }

    fn set(&mut self, from: Node, to: Node, weight: Cost) {
        // Self-loops are never traversed, the diagonal stays at zero.
        if self.contains(from) && self.contains(to) && from != to {
            self.weights[from * self.size + to] = weight;
        }
    }

    /// Sets the directed weight `from -> to`. Out-of-range indices are ignored.
    pub fn set_connection(&mut self, from: Node, to: Node, weight: f64) {
        self.set(from, to, Cost::from(weight));
    }

    /// Removes the directed edge `from -> to`. Out-of-range indices are ignored.
    pub fn remove_connection(&mut self, from: Node, to: Node) {
        self.set(from, to, Cost::Unreachable);
    }

    /// Sets the same weight in both directions.
    pub fn connect(&mut self, a: Node, b: Node, weight: f64) {
        self.set_connection(a, b, weight);
        self.set_connection(b, a, weight);
    }

    /// Returns the weight of `from -> to`, unreachable for out-of-range indices.
    pub fn connection_weight(&self, from: Node, to: Node) -> Cost {
        if self.contains(from) && self.contains(to) {
            self.weights[from * self.size + to]
        } else {
            Cost::Unreachable
        }
    }

    pub fn has_edge(&self, from: Node, to: Node) -> bool {
        from != to && self.connection_weight(from, to).is_finite()
    }

    /// Nodes reachable from `node` over a single edge, in ascending order.
    pub fn neighbors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        (0..self.size).filter(move |&other| self.has_edge(node, other))
    }

    /// Rewires every unordered pair: with `connection_probability` the pair gets a
    /// symmetric integer weight drawn from `1..=max_weight`, otherwise both
    /// directions are removed.
    #[instrument(level = "debug", skip(self, rng), fields(size = self.size, max_weight = max_weight, connection_probability = connection_probability.get()))]
    pub fn generate_random_network<R: Rng>(
        &mut self,
        rng: &mut R,
        max_weight: u32,
        connection_probability: Probability,
    ) -> Result<(), GraphError> {
        if max_weight < 1 {
            return Err(GraphError::InvalidMaxWeight { max_weight });
        }

        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if connection_probability.sample(rng) {
                    let weight = rng.random_range(1..=max_weight);
                    self.connect(i, j, weight as f64);
                } else {
                    self.remove_connection(i, j);
                    self.remove_connection(j, i);
                }
            }
        }

        Ok(())
    }

    /// Sums the edge weights along `path`.
    ///
    /// Unreachable for paths shorter than two nodes or with any missing edge.
    pub fn path_cost(&self, path: &[Node]) -> Cost {
        if path.len() < 2 {
            return Cost::Unreachable;
        }

        path.windows(2)
            .map(|pair| self.connection_weight(pair[0], pair[1]))
            .fold(Cost::ZERO, |total, weight| total + weight)
    }

    /// A path is valid when it starts at the sender, ends at the receiver, stays
    /// in range, visits no interior node twice and only uses existing edges.
    pub fn is_valid_path(&self, path: &[Node]) -> bool {
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return false;
        };
        if path.len() < 2 || first != self.sender || last != self.receiver {
            return false;
        }
        if !path.iter().all(|&node| self.contains(node)) {
            return false;
        }

        let interior = &path[1..path.len() - 1];
        let unique: HashSet<Node> = interior.iter().copied().collect();
        if unique.len() != interior.len() {
            return false;
        }

        path.windows(2).all(|pair| self.connection_weight(pair[0], pair[1]).is_finite())
    }

    /// Exact shortest path from sender to receiver.
    ///
    /// Dense O(n²) scan without a priority queue. Returns an empty path and
    /// [`Cost::Unreachable`] when the receiver cannot be reached.
    #[instrument(level = "debug", skip(self), fields(size = self.size, sender = self.sender, receiver = self.receiver))]
    pub fn shortest_path(&self) -> (Vec<Node>, Cost) {
        let mut distances = vec![Cost::Unreachable; self.size];
        let mut previous: Vec<Option<Node>> = vec![None; self.size];
        let mut visited = vec![false; self.size];

        distances[self.sender] = Cost::ZERO;

        for _ in 0..self.size {
            let closest = (0..self.size)
                .filter(|&node| !visited[node] && distances[node].is_finite())
                .min_by(|&a, &b| distances[a].cmp(&distances[b]));

            let Some(current) = closest else {
                break;
            };
            visited[current] = true;

            for next in self.neighbors(current) {
                if visited[next] {
                    continue;
                }
                let candidate = distances[current] + self.connection_weight(current, next);
                if candidate < distances[next] {
                    distances[next] = candidate;
                    previous[next] = Some(current);
                }
            }
        }

        let cost = distances[self.receiver];
        if !cost.is_finite() {
            return (Vec::new(), Cost::Unreachable);
        }

        let mut path = vec![self.receiver];
        let mut current = self.receiver;
        while let Some(parent) = previous[current] {
            path.push(parent);
            current = parent;
        }
        path.reverse();

        (path, cost)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Adjacency matrix:\n    ")?;
        for j in 0..self.size {
            write!(f, "{j:>4}")?;
        }
        writeln!(f)?;

        for i in 0..self.size {
            write!(f, "{i:>2}: ")?;
            for j in 0..self.size {
                match self.connection_weight(i, j) {
                    Cost::Finite(weight) => write!(f, "{:>3}", weight.floor() as i64)?,
                    Cost::Unreachable => write!(f, "  ∞")?,
                }
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(f, "Sender: {}", self.sender)?;
        writeln!(f, "Receiver: {}", self.receiver)
    }
}
