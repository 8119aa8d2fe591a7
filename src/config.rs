//! File-level configuration of the `evolab` binary.
//!
//! Every section falls back to its defaults, so an empty JSON object is a
//! valid configuration:
//!
//! ```rust
//! use evolab::config::LabConfig;
//!
//! let config = LabConfig::from_json(r#"{ "network": { "size": 6, "seed": 3 } }"#)?;
//! let graph = config.network.build()?;
//!
//! assert_eq!(graph.size(), 6);
//! assert_eq!(graph.receiver(), 5);
//! assert_eq!(config.max_generations, 100);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::models::{Graph, GraphError, Node, Probability};
use crate::services::evolution::GaConfig;
use crate::services::training::TrainingOptions;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LabConfigError {
    #[error("Io: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Undirected edge of an explicitly listed network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: Node,
    pub to: Node,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomNetwork {
    pub max_weight: u32,
    pub connection_probability: Probability,
}

impl Default for RandomNetwork {
    fn default() -> Self {
        Self {
            max_weight: 10,
            connection_probability: Probability::new_unchecked(0.7),
        }
    }
}

/// Description of the graph to search.
///
/// Listed `edges` are applied on top of the random generation when both are
/// given. Without either, a random network with default parameters is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSpec {
    pub size: usize,
    pub sender: Node,
    /// Defaults to the last node.
    pub receiver: Option<Node>,
    pub edges: Vec<EdgeSpec>,
    pub random: Option<RandomNetwork>,
    /// Seeds the random generation; drawn from the OS when unset.
    pub seed: Option<u64>,
}

impl Default for NetworkSpec {
    fn default() -> Self {
        Self {
            size: 10,
            sender: 0,
            receiver: None,
            edges: Vec::new(),
            random: None,
            seed: None,
        }
    }
}

impl NetworkSpec {
    pub fn build(&self) -> Result<Graph, GraphError> {
        let receiver = self.receiver.unwrap_or(self.size.saturating_sub(1));
        let mut graph = Graph::new(self.size, self.sender, receiver)?;

        let random = match self.random {
            Some(random) => Some(random),
            None if self.edges.is_empty() => Some(RandomNetwork::default()),
            None => None,
        };
        if let Some(random) = random {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            graph.generate_random_network(
                &mut rng,
                random.max_weight,
                random.connection_probability,
            )?;
        }

        for edge in &self.edges {
            for node in [edge.from, edge.to] {
                if node >= self.size {
                    return Err(GraphError::NodeOutOfRange {
                        node,
                        size: self.size,
                    });
                }
            }
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(GraphError::InvalidWeight {
                    weight: edge.weight,
                });
            }
            graph.connect(edge.from, edge.to, edge.weight);
        }

        Ok(graph)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub network: NetworkSpec,
    pub ga: GaConfig,
    pub max_generations: u32,
    pub training: TrainingOptions,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            network: NetworkSpec::default(),
            ga: GaConfig::default(),
            max_generations: 100,
            training: TrainingOptions::default(),
        }
    }
}

impl LabConfig {
    pub fn from_json(json: &str) -> Result<Self, LabConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LabConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
