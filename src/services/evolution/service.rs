use super::events::{Observer, Step, StepDetail, StepEvent};
use super::{GaConfig, GeneticAlgorithmBuilder};
use crate::models::{
    Chromosome, Cost, FitnessStatistics, GenerationRecord, Graph, Node, Population, Selector,
    StopDecision, StopReason, StoppingCriteria, Terminated,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::instrument;
use uuid::Uuid;

/// Lifecycle of a genetic algorithm instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    /// Ended by the generation budget or by cancellation.
    Stopped,
    /// Ended by one of the stopping criteria.
    Converged,
}

impl From<StopReason> for RunState {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::GenerationLimit | StopReason::Cancelled => RunState::Stopped,
            StopReason::OptimalFound | StopReason::Stagnated | StopReason::DiversityCollapsed => {
                RunState::Converged
            }
        }
    }
}

/// Result of [`GeneticAlgorithm::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub best: Option<Chromosome>,
    pub history: Vec<GenerationRecord>,
    pub reason: StopReason,
    pub generations: u32,
    pub execution_time_secs: f64,
    pub optimal_path: Vec<Node>,
    pub optimal_cost: Cost,
}

impl RunOutcome {
    pub fn best_fitness(&self) -> Cost {
        self.best.as_ref().map_or(Cost::Unreachable, Chromosome::fitness)
    }

    pub fn best_cost(&self) -> Cost {
        self.best.as_ref().map_or(Cost::Unreachable, Chromosome::cost)
    }
}

/// Result of a single [`GeneticAlgorithm::step`].
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub generation: u32,
    pub best: Option<Chromosome>,
    pub statistics: FitnessStatistics,
    pub decision: StopDecision,
}

/// Run statistics, reset at the start of every run.
#[derive(Debug, Clone, Serialize)]
pub struct GaStatistics {
    pub generations: u32,
    pub execution_time_secs: f64,
    pub best_fitness_history: Vec<Cost>,
    pub average_fitness_history: Vec<Cost>,
    pub final_best_fitness: Cost,
    pub parameters: GaConfig,
}

/// Evolves paths from sender to receiver over an owned graph.
///
/// A run initialises a random population, then breeds one generation at a
/// time: elites are copied over, parents are selected, crossed over with
/// `crossover_rate`, mutated, repaired and appended until the target size is
/// reached. The new set is truncated or padded to size and deduplicated. After
/// every generation the [`StoppingCriteria`] decide whether to continue.
pub struct GeneticAlgorithm {
    pub(super) graph: Graph,
    pub(super) config: GaConfig,
    pub(super) selector: Selector,
    pub(super) rng: StdRng,
    pub(super) criteria: StoppingCriteria,
    pub(super) optimal_path: Vec<Node>,
    pub(super) observer: Option<Box<dyn Observer>>,
    pub(super) terminated: Option<Box<dyn Terminated>>,
    pub(super) state: RunState,
    pub(super) generations: u32,
    pub(super) best_fitness_history: Vec<Cost>,
    pub(super) average_fitness_history: Vec<Cost>,
    pub(super) execution_time: Duration,
    pub(super) population: Option<Population>,
}

impl GeneticAlgorithm {
    pub fn builder(graph: Graph) -> GeneticAlgorithmBuilder {
        GeneticAlgorithmBuilder::new(graph)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn criteria(&self) -> &StoppingCriteria {
        &self.criteria
    }

    /// The exact shortest path used as the reference solution.
    pub fn optimal(&self) -> (&[Node], Cost) {
        (&self.optimal_path, self.criteria.optimal_cost)
    }

    /// The population carried between [`GeneticAlgorithm::step`] calls.
    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    /// Runs up to `max_generations` generations from a fresh random population.
    #[instrument(level = "info", skip(self), fields(population_size = self.config.population_size, selection_method = %self.config.selection_method, crossover_method = %self.config.crossover_method))]
    pub fn run(&mut self, max_generations: u32) -> RunOutcome {
        tracing::info!("Genetic algorithm run started");

        let started = Instant::now();
        self.reset();
        self.state = RunState::Running;

        let mut population = self.initial_population();
        let mut reason = StopReason::GenerationLimit;

        for generation in 0..max_generations {
            if self.is_terminated() {
                reason = StopReason::Cancelled;
                break;
            }

            self.generations = generation + 1;
            if let StopDecision::Stop(stop) = self.advance(&mut population) {
                reason = stop;
                break;
            }
        }

        self.execution_time = started.elapsed();
        self.state = RunState::from(reason);

        let outcome = RunOutcome {
            id: Uuid::now_v7(),
            finished_at: Utc::now(),
            best: population.best().cloned(),
            history: population.history().to_vec(),
            reason,
            generations: self.generations,
            execution_time_secs: self.execution_time.as_secs_f64(),
            optimal_path: self.optimal_path.clone(),
            optimal_cost: self.criteria.optimal_cost,
        };

        tracing::info!(
            message = "Genetic algorithm run finished",
            run_id = %outcome.id,
            reason = %reason,
            generations = outcome.generations,
            best_fitness = %outcome.best_fitness(),
            optimal_cost = %outcome.optimal_cost
        );

        outcome
    }

    /// Advances the persisted population by exactly one generation,
    /// initialising it on the first call.
    ///
    /// Stop decisions are reported but do not prevent further steps.
    #[instrument(level = "info", skip(self), fields(generation = self.generations))]
    pub fn step(&mut self) -> StepOutcome {
        let started = Instant::now();
        let mut population = match self.population.take() {
            Some(population) => population,
            None => self.initial_population(),
        };

        let decision = if self.is_terminated() {
            StopDecision::Stop(StopReason::Cancelled)
        } else {
            self.advance(&mut population)
        };

        self.generations = population.generation();
        self.execution_time += started.elapsed();
        self.state = match decision {
            StopDecision::Continue => RunState::Running,
            StopDecision::Stop(reason) => RunState::from(reason),
        };

        let outcome = StepOutcome {
            generation: population.generation(),
            best: population.best().cloned(),
            statistics: population.statistics(),
            decision,
        };
        self.population = Some(population);

        outcome
    }

    /// Clears run statistics and the step-mode population. The graph,
    /// parameters, observer and random number generator are kept.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.generations = 0;
        self.best_fitness_history.clear();
        self.average_fitness_history.clear();
        self.execution_time = Duration::ZERO;
        self.population = None;
    }

    pub fn statistics(&self) -> GaStatistics {
        GaStatistics {
            generations: self.generations,
            execution_time_secs: self.execution_time.as_secs_f64(),
            best_fitness_history: self.best_fitness_history.clone(),
            average_fitness_history: self.average_fitness_history.clone(),
            final_best_fitness: self
                .best_fitness_history
                .last()
                .copied()
                .unwrap_or(Cost::Unreachable),
            parameters: self.config.clone(),
        }
    }

    fn is_terminated(&self) -> bool {
        self.terminated
            .as_ref()
            .is_some_and(|terminated| terminated.is_terminated())
    }

    fn notify(&mut self, step: Step, population: &Population, detail: StepDetail<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer.notify(&StepEvent::new(step, population, detail));
        }
    }

    fn initial_population(&mut self) -> Population {
        let mut population = Population::new(
            self.config.population_size,
            &self.graph,
            self.config.chromosome_length,
        );
        population.initialize_random(&self.graph, &mut self.rng);
        self.notify(Step::Initialization, &population, StepDetail::None);
        population
    }

    /// Breeds, installs and records one generation, then evaluates the
    /// stopping criteria.
    fn advance(&mut self, population: &mut Population) -> StopDecision {
        self.notify(Step::GenerationStart, population, StepDetail::None);

        let next = self.next_generation(population);
        population.replace_chromosomes(next.into_chromosomes());
        population.update_generation();

        let statistics = population.statistics();
        self.best_fitness_history.push(statistics.min);
        self.average_fitness_history.push(statistics.avg);

        self.notify(Step::GenerationEnd, population, StepDetail::None);

        let best_cost = population.best().map_or(Cost::Unreachable, Chromosome::cost);
        let decision = self.criteria.evaluate(
            best_cost,
            &self.best_fitness_history,
            population.diversity(),
        );

        tracing::debug!(
            message = "Generation completed",
            generation = population.generation(),
            best_fitness = %statistics.min,
            average_fitness = %statistics.avg,
            decision = ?decision
        );

        decision
    }

    #[instrument(level = "debug", skip(self, population), fields(generation = population.generation(), size = population.len()))]
    fn next_generation(&mut self, population: &Population) -> Population {
        let mut next = population.offspring();

        let elite_count = self.config.elite_size.min(population.len());
        let elites = &population.chromosomes()[..elite_count];
        for elite in elites {
            next.push(elite.clone());
        }
        self.notify(Step::EliteSelection, population, StepDetail::Elites(elites));

        while next.len() < self.config.population_size {
            let Some(first) = population.select(&self.selector, &mut self.rng) else {
                break;
            };
            let Some(second) = population.select(&self.selector, &mut self.rng) else {
                break;
            };
            self.notify(
                Step::ParentSelection,
                population,
                StepDetail::Parents { first, second },
            );

            let (first_child, second_child) = if self.config.crossover_rate.sample(&mut self.rng)
            {
                let children = first.crossover(
                    second,
                    self.config.crossover_method,
                    &self.graph,
                    &mut self.rng,
                );
                self.notify(
                    Step::Crossover,
                    population,
                    StepDetail::Crossover {
                        parents: (first, second),
                        children: (&children.0, &children.1),
                    },
                );
                children
            } else {
                (first.clone(), second.clone())
            };

            let first_child =
                first_child.mutate(&self.graph, self.config.mutation_rate, &mut self.rng);
            let second_child =
                second_child.mutate(&self.graph, self.config.mutation_rate, &mut self.rng);
            self.notify(
                Step::Mutation,
                population,
                StepDetail::Mutation {
                    children: (&first_child, &second_child),
                },
            );

            next.push(first_child.repair(&self.graph));
            next.push(second_child.repair(&self.graph));
        }

        next.maintain_size(&self.graph, &mut self.rng);
        next.remove_duplicates();
        self.notify(
            Step::PopulationUpdate,
            population,
            StepDetail::PopulationUpdate { next: &next },
        );

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Probability;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Ladder 0..=7 with a cheap spine 0-2-4-6-7 and costlier rungs.
    fn ladder_graph() -> Graph {
        let mut graph = Graph::new(8, 0, 7).expect("is valid");
        for (a, b, weight) in [
            (0, 1, 3.0),
            (0, 2, 1.0),
            (1, 3, 3.0),
            (2, 4, 1.0),
            (1, 2, 2.0),
            (3, 4, 2.0),
            (3, 5, 3.0),
            (4, 6, 1.0),
            (5, 6, 2.0),
            (5, 7, 3.0),
            (6, 7, 1.0),
        ] {
            graph.connect(a, b, weight);
        }
        graph
    }

    fn seeded(graph: Graph, seed: u64) -> GeneticAlgorithm {
        GeneticAlgorithm::builder(graph)
            .with_seed(seed)
            .build()
            .expect("default config is valid")
    }

    #[derive(Clone, Default)]
    struct Recorder {
        steps: Rc<RefCell<Vec<(Step, u32)>>>,
    }

    impl Observer for Recorder {
        fn notify(&mut self, event: &StepEvent<'_>) {
            assert_eq!(event.best, event.population.best());
            self.steps.borrow_mut().push((event.step, event.generation));
        }
    }

    #[test]
    fn test_run_finds_the_shortest_path() {
        let mut ga = seeded(ladder_graph(), 42);

        let outcome = ga.run(100);

        assert_eq!(outcome.optimal_cost, Cost::Finite(4.0));
        assert_eq!(outcome.optimal_path, vec![0, 2, 4, 6, 7]);
        assert_eq!(outcome.reason, StopReason::OptimalFound);
        assert_eq!(outcome.best_cost(), Cost::Finite(4.0));
        assert_eq!(ga.state(), RunState::Converged);
    }

    #[test]
    fn test_run_records_one_history_entry_per_generation() {
        let mut ga = seeded(ladder_graph(), 7);

        let outcome = ga.run(100);
        let statistics = ga.statistics();

        assert!(outcome.generations >= 1);
        assert_eq!(outcome.history.len(), outcome.generations as usize);
        assert_eq!(statistics.generations, outcome.generations);
        assert_eq!(
            statistics.best_fitness_history.len(),
            outcome.generations as usize
        );
        assert_eq!(
            statistics.average_fitness_history.len(),
            outcome.generations as usize
        );
        for (index, record) in outcome.history.iter().enumerate() {
            assert_eq!(record.generation as usize, index + 1);
            assert_eq!(record.best, statistics.best_fitness_history[index]);
        }
        assert_eq!(statistics.final_best_fitness, outcome.best_fitness());
    }

    #[test]
    fn test_elitism_never_loses_the_best() {
        let mut ga = seeded(ladder_graph(), 3);

        let outcome = ga.run(100);

        for pair in outcome.history.windows(2) {
            assert!(pair[1].best <= pair[0].best);
        }
    }

    #[test]
    fn test_runs_are_reproducible_with_a_seed() {
        let first = seeded(ladder_graph(), 11).run(30);
        let second = seeded(ladder_graph(), 11).run(30);

        assert_eq!(first.history, second.history);
        assert_eq!(first.best, second.best);
        assert_eq!(first.reason, second.reason);
    }

    #[test]
    fn test_zero_generations_returns_the_initial_best() {
        let mut ga = seeded(ladder_graph(), 1);

        let outcome = ga.run(0);

        assert_eq!(outcome.reason, StopReason::GenerationLimit);
        assert_eq!(outcome.generations, 0);
        assert!(outcome.history.is_empty());
        assert!(outcome.best.is_some());
        assert_eq!(ga.state(), RunState::Stopped);
    }

    #[test]
    fn test_unreachable_receiver_stops_on_collapsed_diversity() {
        let mut graph = Graph::new(5, 0, 4).expect("is valid");
        graph.connect(0, 1, 1.0);
        graph.connect(1, 2, 1.0);
        let mut ga = seeded(graph, 5);

        let outcome = ga.run(50);

        assert_eq!(outcome.optimal_cost, Cost::Unreachable);
        assert!(outcome.optimal_path.is_empty());
        assert_eq!(outcome.best_fitness(), Cost::Unreachable);
        assert_eq!(outcome.reason, StopReason::DiversityCollapsed);
        assert_eq!(outcome.generations, 1);
    }

    #[test]
    fn test_cancellation_is_checked_per_generation() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut ga = GeneticAlgorithm::builder(ladder_graph())
            .with_seed(2)
            .with_termination(flag.clone())
            .build()
            .expect("is valid");

        let outcome = ga.run(100);

        assert_eq!(outcome.reason, StopReason::Cancelled);
        assert_eq!(outcome.generations, 0);
        assert_eq!(ga.state(), RunState::Stopped);

        flag.store(false, Ordering::Relaxed);
        assert_ne!(ga.run(100).reason, StopReason::Cancelled);
    }

    #[test]
    fn test_observer_sees_named_steps_in_order() {
        let recorder = Recorder::default();
        let mut ga = GeneticAlgorithm::builder(ladder_graph())
            .with_config(GaConfig {
                population_size: 10,
                elite_size: 2,
                crossover_rate: Probability::ALWAYS,
                ..Default::default()
            })
            .with_seed(9)
            .with_observer(recorder.clone())
            .build()
            .expect("is valid");

        ga.step();

        let steps: Vec<Step> = recorder.steps.borrow().iter().map(|(step, _)| *step).collect();
        assert_eq!(steps[0], Step::Initialization);
        assert_eq!(steps[1], Step::GenerationStart);
        assert_eq!(steps[2], Step::EliteSelection);
        assert_eq!(steps[3], Step::ParentSelection);
        assert_eq!(steps[4], Step::Crossover);
        assert_eq!(steps[5], Step::Mutation);
        assert_eq!(steps[steps.len() - 2], Step::PopulationUpdate);
        assert_eq!(steps[steps.len() - 1], Step::GenerationEnd);

        // Four breeding rounds of two children fill the eight free slots
        let rounds = steps.iter().filter(|step| **step == Step::ParentSelection).count();
        assert_eq!(rounds, 4);

        // Everything before generation end still reports the parent generation
        let generations: Vec<u32> = recorder.steps.borrow().iter().map(|(_, g)| *g).collect();
        assert!(generations[..generations.len() - 1].iter().all(|g| *g == 0));
        assert_eq!(generations[generations.len() - 1], 1);
    }

    #[test]
    fn test_step_mode_persists_the_population() {
        let mut ga = seeded(ladder_graph(), 21);

        let first = ga.step();
        let second = ga.step();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(ga.population().map(Population::generation), Some(2));
        assert_eq!(ga.statistics().best_fitness_history.len(), 2);

        ga.reset();
        assert!(ga.population().is_none());
        assert_eq!(ga.state(), RunState::Idle);
        assert_eq!(ga.statistics().generations, 0);
        assert_eq!(ga.step().generation, 1);
    }

    #[test]
    fn test_run_resets_previous_statistics() {
        let mut ga = seeded(ladder_graph(), 8);

        ga.step();
        ga.step();
        let outcome = ga.run(1);

        assert_eq!(outcome.generations, 1);
        assert_eq!(ga.statistics().best_fitness_history.len(), 1);
        assert!(ga.population().is_none());
    }
}
