use super::events::Observer;
use super::service::RunState;
use super::{Error, GaConfig, GeneticAlgorithm};
use crate::models::{Graph, StoppingCriteria, Terminated};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::instrument;

pub struct GeneticAlgorithmBuilder {
    graph: Graph,
    config: GaConfig,
    observer: Option<Box<dyn Observer>>,
    terminated: Option<Box<dyn Terminated>>,
}

impl GeneticAlgorithmBuilder {
    pub(super) fn new(graph: Graph) -> Self {
        Self {
            graph,
            config: GaConfig::default(),
            observer: None,
            terminated: None,
        }
    }

    pub fn with_config(mut self, config: GaConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the seed of the current config.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_termination(mut self, terminated: impl Terminated + 'static) -> Self {
        self.terminated = Some(Box::new(terminated));
        self
    }

    /// Validates the config and solves the reference shortest path once.
    #[instrument(level = "debug", skip(self), fields(graph_size = self.graph.size(), population_size = self.config.population_size, seed = ?self.config.seed))]
    pub fn build(self) -> Result<GeneticAlgorithm, Error> {
        self.config.validate()?;
        let selector = self.config.selector()?;

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (optimal_path, optimal_cost) = self.graph.shortest_path();

        Ok(GeneticAlgorithm {
            graph: self.graph,
            config: self.config,
            selector,
            rng,
            criteria: StoppingCriteria::new(optimal_cost),
            optimal_path,
            observer: self.observer,
            terminated: self.terminated,
            state: RunState::Idle,
            generations: 0,
            best_fitness_history: Vec::new(),
            average_fitness_history: Vec::new(),
            execution_time: Duration::ZERO,
            population: None,
        })
    }
}
