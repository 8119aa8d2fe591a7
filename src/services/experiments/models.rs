use crate::models::{
    Cost, CrossoverMethod, GenerationRecord, Probability, ProbabilityOutOfRange, SelectionMethod,
    StopReason,
};
use crate::services::evolution::GaConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Width of the trailing window used to detect convergence.
const CONVERGENCE_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    PopulationSize,
    MutationRate,
    CrossoverRate,
    SelectionMethod,
    CrossoverMethod,
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExperimentKind::PopulationSize => "population size",
            ExperimentKind::MutationRate => "mutation rate",
            ExperimentKind::CrossoverRate => "crossover rate",
            ExperimentKind::SelectionMethod => "selection method",
            ExperimentKind::CrossoverMethod => "crossover method",
        };
        f.write_str(name)
    }
}

/// The single value a sweep unit overrides in the base config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Parameter {
    PopulationSize(usize),
    MutationRate(f64),
    CrossoverRate(f64),
    Selection(SelectionMethod),
    Crossover(CrossoverMethod),
}

impl Parameter {
    pub fn kind(&self) -> ExperimentKind {
        match self {
            Parameter::PopulationSize(_) => ExperimentKind::PopulationSize,
            Parameter::MutationRate(_) => ExperimentKind::MutationRate,
            Parameter::CrossoverRate(_) => ExperimentKind::CrossoverRate,
            Parameter::Selection(_) => ExperimentKind::SelectionMethod,
            Parameter::Crossover(_) => ExperimentKind::CrossoverMethod,
        }
    }

    pub fn apply(&self, config: &mut GaConfig) -> Result<(), ProbabilityOutOfRange> {
        match *self {
            Parameter::PopulationSize(size) => config.population_size = size,
            Parameter::MutationRate(rate) => {
                config.mutation_rate = Probability::named("mutation_rate", rate)?
            }
            Parameter::CrossoverRate(rate) => {
                config.crossover_rate = Probability::named("crossover_rate", rate)?
            }
            Parameter::Selection(method) => config.selection_method = method,
            Parameter::Crossover(method) => config.crossover_method = method,
        }
        Ok(())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::PopulationSize(size) => write!(f, "{size}"),
            Parameter::MutationRate(rate) | Parameter::CrossoverRate(rate) => write!(f, "{rate}"),
            Parameter::Selection(method) => write!(f, "{method}"),
            Parameter::Crossover(method) => write!(f, "{method}"),
        }
    }
}

/// One parameter varied across a list of values, everything else taken from
/// the base config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sweep {
    pub kind: ExperimentKind,
    pub parameters: Vec<Parameter>,
    pub max_generations: u32,
}

impl Sweep {
    pub fn population_size(sizes: &[usize], max_generations: u32) -> Self {
        Self {
            kind: ExperimentKind::PopulationSize,
            parameters: sizes.iter().copied().map(Parameter::PopulationSize).collect(),
            max_generations,
        }
    }

    pub fn mutation_rate(rates: &[f64], max_generations: u32) -> Self {
        Self {
            kind: ExperimentKind::MutationRate,
            parameters: rates.iter().copied().map(Parameter::MutationRate).collect(),
            max_generations,
        }
    }

    pub fn crossover_rate(rates: &[f64], max_generations: u32) -> Self {
        Self {
            kind: ExperimentKind::CrossoverRate,
            parameters: rates.iter().copied().map(Parameter::CrossoverRate).collect(),
            max_generations,
        }
    }

    pub fn selection_method(methods: &[SelectionMethod], max_generations: u32) -> Self {
        Self {
            kind: ExperimentKind::SelectionMethod,
            parameters: methods.iter().copied().map(Parameter::Selection).collect(),
            max_generations,
        }
    }

    pub fn crossover_method(methods: &[CrossoverMethod], max_generations: u32) -> Self {
        Self {
            kind: ExperimentKind::CrossoverMethod,
            parameters: methods.iter().copied().map(Parameter::Crossover).collect(),
            max_generations,
        }
    }

    /// The five standard sweeps, in the order they are run.
    pub fn defaults() -> Vec<Sweep> {
        vec![
            Sweep::population_size(&[20, 50, 100, 150, 200], 50),
            Sweep::mutation_rate(&[0.01, 0.05, 0.1, 0.2, 0.3], 100),
            Sweep::crossover_rate(&[0.3, 0.5, 0.7, 0.8, 0.9], 100),
            Sweep::selection_method(&SelectionMethod::ALL, 100),
            Sweep::crossover_method(&CrossoverMethod::ALL, 100),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentResult {
    pub run_id: Uuid,
    pub kind: ExperimentKind,
    pub parameter: Parameter,
    pub best_fitness: Cost,
    pub optimal_cost: Cost,
    pub generations: u32,
    pub execution_time_secs: f64,
    pub convergence_generation: usize,
    pub reason: StopReason,
}

/// One generation of one run in a convergence study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergencePoint {
    /// 1-based run number.
    pub run: usize,
    pub generation: u32,
    pub best: Cost,
    pub average: Cost,
}

/// Generations until the best fitness settled.
///
/// Returns the first offset `i - 10` at which the minimum best fitness over
/// the ten records preceding `i` equals the record at `i - 1`, or the history
/// length when that never happens or the history is shorter than ten.
pub fn find_convergence_generation(history: &[GenerationRecord]) -> usize {
    if history.len() < CONVERGENCE_WINDOW {
        return history.len();
    }

    (CONVERGENCE_WINDOW..history.len())
        .find(|&i| {
            let window = &history[i - CONVERGENCE_WINDOW..i];
            window.iter().map(|record| record.best).min() == Some(history[i - 1].best)
        })
        .map(|i| i - CONVERGENCE_WINDOW)
        .unwrap_or(history.len())
}

/// Best result of one experiment kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindSummary {
    pub results: Vec<ExperimentResult>,
    pub best_parameter: Parameter,
    pub best_fitness: Cost,
    pub optimal_cost: Cost,
    /// Percent above the optimal cost, when that is finite and non-zero.
    pub deviation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallBest {
    pub kind: ExperimentKind,
    pub parameter: Parameter,
    pub best_fitness: Cost,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub experiments: BTreeMap<ExperimentKind, KindSummary>,
    /// Lowest finite best fitness over all results.
    pub summary: Option<OverallBest>,
}

impl ExperimentReport {
    /// Groups results by kind and picks the lowest fitness of each group,
    /// earliest result first on ties.
    pub fn from_results(results: &[ExperimentResult]) -> Self {
        let mut grouped: BTreeMap<ExperimentKind, Vec<ExperimentResult>> = BTreeMap::new();
        for result in results {
            grouped.entry(result.kind).or_default().push(result.clone());
        }

        let experiments = grouped
            .into_iter()
            .filter_map(|(kind, results)| {
                let best = results.iter().min_by_key(|result| result.best_fitness)?.clone();
                let summary = KindSummary {
                    best_parameter: best.parameter,
                    best_fitness: best.best_fitness,
                    optimal_cost: best.optimal_cost,
                    deviation: best.best_fitness.deviation_percent(&best.optimal_cost),
                    results,
                };
                Some((kind, summary))
            })
            .collect();

        let summary = results
            .iter()
            .filter(|result| result.best_fitness.is_finite())
            .min_by_key(|result| result.best_fitness)
            .map(|result| OverallBest {
                kind: result.kind,
                parameter: result.parameter,
                best_fitness: result.best_fitness,
            });

        Self {
            experiments,
            summary,
        }
    }
}
