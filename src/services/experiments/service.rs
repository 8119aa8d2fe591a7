use super::models::{
    ConvergencePoint, ExperimentKind, ExperimentResult, Parameter, Sweep,
    find_convergence_generation,
};
use super::Error;
use crate::models::{Graph, Terminated};
use crate::services::evolution::{GaConfig, GeneticAlgorithm};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::instrument;

/// Receives `(index, total, message)` as the runner moves through its sweeps.
pub trait Progress {
    fn report(&mut self, index: usize, total: usize, message: &str);
}

impl<F> Progress for F
where
    F: FnMut(usize, usize, &str),
{
    fn report(&mut self, index: usize, total: usize, message: &str) {
        self(index, total, message)
    }
}

/// Runs one full genetic algorithm per parameter value and collects the results.
///
/// Every unit starts from the base config with one field overridden and gets
/// its own seed drawn from the runner, so a seeded runner is reproducible.
pub struct ExperimentRunner {
    graph: Graph,
    base: GaConfig,
    rng: StdRng,
    terminated: Option<Arc<dyn Terminated>>,
    progress: Option<Box<dyn Progress>>,
}

impl ExperimentRunner {
    pub fn new(graph: Graph, base: GaConfig) -> Self {
        let rng = match base.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            graph,
            base,
            rng,
            terminated: None,
            progress: None,
        }
    }

    /// Shares a cancellation flag, checked between units and by each run.
    pub fn with_termination(mut self, terminated: impl Terminated + 'static) -> Self {
        self.terminated = Some(Arc::new(terminated));
        self
    }

    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    fn is_terminated(&self) -> bool {
        self.terminated
            .as_ref()
            .is_some_and(|terminated| terminated.is_terminated())
    }

    fn report(&mut self, index: usize, total: usize, message: &str) {
        if let Some(progress) = self.progress.as_mut() {
            progress.report(index, total, message);
        }
    }

    /// Runs [`Sweep::defaults`] in order.
    pub fn run_all(&mut self) -> Vec<ExperimentResult> {
        self.run_sweeps(&Sweep::defaults())
    }

    #[instrument(level = "info", skip(self, sweeps), fields(sweeps = sweeps.len()))]
    pub fn run_sweeps(&mut self, sweeps: &[Sweep]) -> Vec<ExperimentResult> {
        let total = sweeps.len();
        let mut results = Vec::new();

        for (index, sweep) in sweeps.iter().enumerate() {
            if self.is_terminated() {
                tracing::info!(message = "Experiments cancelled", completed_sweeps = index);
                break;
            }

            let message = format!("Experiment {}: {}", index + 1, sweep.kind);
            self.report(index + 1, total, &message);
            results.extend(self.run_sweep(sweep));
        }

        self.report(total, total, "Experiments completed");
        results
    }

    /// Runs every parameter of `sweep`. Units that fail to build are logged
    /// and skipped.
    #[instrument(level = "info", skip(self, sweep), fields(kind = %sweep.kind, parameters = sweep.parameters.len(), max_generations = sweep.max_generations))]
    pub fn run_sweep(&mut self, sweep: &Sweep) -> Vec<ExperimentResult> {
        let mut results = Vec::with_capacity(sweep.parameters.len());

        for parameter in &sweep.parameters {
            if self.is_terminated() {
                break;
            }

            match self.run_unit(sweep.kind, *parameter, sweep.max_generations) {
                Ok(result) => results.push(result),
                Err(error) => tracing::error!(
                    message = "Experiment unit failed, skipping",
                    kind = %sweep.kind,
                    parameter = %parameter,
                    error = %error
                ),
            }
        }

        results
    }

    fn build(&mut self, config: GaConfig) -> Result<GeneticAlgorithm, Error> {
        let mut builder = GeneticAlgorithm::builder(self.graph.clone())
            .with_config(config)
            .with_seed(self.rng.random());
        if let Some(terminated) = self.terminated.clone() {
            builder = builder.with_termination(terminated);
        }

        Ok(builder.build()?)
    }

    fn run_unit(
        &mut self,
        kind: ExperimentKind,
        parameter: Parameter,
        max_generations: u32,
    ) -> Result<ExperimentResult, Error> {
        let mut config = self.base.clone();
        parameter.apply(&mut config)?;

        let mut algorithm = self.build(config)?;
        let outcome = algorithm.run(max_generations);

        Ok(ExperimentResult {
            run_id: outcome.id,
            kind,
            parameter,
            best_fitness: outcome.best_fitness(),
            optimal_cost: outcome.optimal_cost,
            generations: outcome.generations,
            execution_time_secs: outcome.execution_time_secs,
            convergence_generation: find_convergence_generation(&outcome.history),
            reason: outcome.reason,
        })
    }

    /// Repeats the base config `runs` times and flattens every run's history.
    #[instrument(level = "info", skip(self))]
    pub fn convergence_study(
        &mut self,
        runs: usize,
        max_generations: u32,
    ) -> Result<Vec<ConvergencePoint>, Error> {
        let mut points = Vec::new();

        for run in 1..=runs {
            if self.is_terminated() {
                break;
            }

            let mut algorithm = self.build(self.base.clone())?;
            let outcome = algorithm.run(max_generations);
            points.extend(outcome.history.iter().map(|record| ConvergencePoint {
                run,
                generation: record.generation,
                best: record.best,
                average: record.average,
            }));
        }

        Ok(points)
    }
}
