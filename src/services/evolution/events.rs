use crate::models::{Chromosome, FitnessStatistics, Population};
use serde::Serialize;
use std::fmt;

/// Named points inside a run at which the observer is notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Initialization,
    GenerationStart,
    EliteSelection,
    ParentSelection,
    Crossover,
    Mutation,
    PopulationUpdate,
    GenerationEnd,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::GenerationStart => "generation_start",
            Self::EliteSelection => "elite_selection",
            Self::ParentSelection => "parent_selection",
            Self::Crossover => "crossover",
            Self::Mutation => "mutation",
            Self::PopulationUpdate => "population_update",
            Self::GenerationEnd => "generation_end",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Step specific payload.
#[derive(Debug, Clone, Copy)]
pub enum StepDetail<'a> {
    None,
    Elites(&'a [Chromosome]),
    Parents {
        first: &'a Chromosome,
        second: &'a Chromosome,
    },
    Crossover {
        parents: (&'a Chromosome, &'a Chromosome),
        children: (&'a Chromosome, &'a Chromosome),
    },
    Mutation {
        children: (&'a Chromosome, &'a Chromosome),
    },
    PopulationUpdate {
        next: &'a Population,
    },
}

/// Read-only snapshot handed to an [`Observer`].
///
/// `population` is always the generation being bred from; the generation
/// under construction is only visible through [`StepDetail::PopulationUpdate`].
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    pub step: Step,
    pub generation: u32,
    pub population: &'a Population,
    pub best: Option<&'a Chromosome>,
    pub statistics: FitnessStatistics,
    pub detail: StepDetail<'a>,
}

impl<'a> StepEvent<'a> {
    pub(crate) fn new(step: Step, population: &'a Population, detail: StepDetail<'a>) -> Self {
        Self {
            step,
            generation: population.generation(),
            population,
            best: population.best(),
            statistics: population.statistics(),
            detail,
        }
    }
}

/// Receives step notifications from a running genetic algorithm.
pub trait Observer {
    fn notify(&mut self, event: &StepEvent<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&StepEvent<'_>),
{
    fn notify(&mut self, event: &StepEvent<'_>) {
        self(event)
    }
}
