use crate::models::Cost;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::instrument;

/// External cancellation flag, polled once per generation or sweep unit.
pub trait Terminated {
    fn is_terminated(&self) -> bool;
}

impl Terminated for AtomicBool {
    fn is_terminated(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: Terminated + ?Sized> Terminated for Arc<T> {
    fn is_terminated(&self) -> bool {
        (**self).is_terminated()
    }
}

impl<T: Terminated + ?Sized> Terminated for &T {
    fn is_terminated(&self) -> bool {
        (**self).is_terminated()
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The best path cost is within tolerance of the exact shortest path.
    OptimalFound,
    /// The best fitness has not improved over the stagnation window.
    Stagnated,
    /// Mean pairwise distance between members fell below the threshold.
    DiversityCollapsed,
    /// The generation budget was spent.
    GenerationLimit,
    /// An external [`Terminated`] flag was raised.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::OptimalFound => "optimal_found",
            Self::Stagnated => "stagnated",
            Self::DiversityCollapsed => "diversity_collapsed",
            Self::GenerationLimit => "generation_limit",
            Self::Cancelled => "cancelled",
        };
        f.write_str(reason)
    }
}

/// Decision taken after each completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopDecision {
    Continue,
    Stop(StopReason),
}

/// Conditions checked after every generation; the first one that holds ends
/// the run.
///
/// # Examples
///
/// ```rust
/// use evolab::models::{Cost, StoppingCriteria};
///
/// let criteria = StoppingCriteria::new(Cost::Finite(12.0));
/// assert_eq!(criteria.tolerance, 0.1);
/// assert_eq!(criteria.stagnation_window, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingCriteria {
    /// Exact shortest path cost used as the reference solution.
    pub optimal_cost: Cost,
    pub tolerance: f64,
    /// Number of recent best-fitness values inspected for improvement.
    pub stagnation_window: usize,
    pub min_diversity: f64,
}

impl StoppingCriteria {
    pub fn new(optimal_cost: Cost) -> Self {
        Self {
            optimal_cost,
            tolerance: 0.1,
            stagnation_window: 20,
            min_diversity: 0.01,
        }
    }

    /// Evaluates the three conditions in order: optimal, stagnation, diversity.
    ///
    /// `best_cost` is the raw path cost of the current best chromosome and
    /// `best_history` holds one best-fitness value per completed generation.
    #[instrument(level = "debug", skip(self, best_history), fields(history_length = best_history.len(), best_cost = %best_cost, diversity = diversity))]
    pub fn evaluate(&self, best_cost: Cost, best_history: &[Cost], diversity: f64) -> StopDecision {
        if let Some(distance) = best_cost.distance(&self.optimal_cost) {
            if distance < self.tolerance {
                return StopDecision::Stop(StopReason::OptimalFound);
            }
        }

        if self.stagnation_window > 0 && best_history.len() >= self.stagnation_window {
            let recent = &best_history[best_history.len() - self.stagnation_window..];
            if recent.iter().min() == recent.last() {
                return StopDecision::Stop(StopReason::Stagnated);
            }
        }

        if diversity < self.min_diversity {
            return StopDecision::Stop(StopReason::DiversityCollapsed);
        }

        StopDecision::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn improving_history(length: usize) -> Vec<Cost> {
        (0..length).map(|i| Cost::Finite(100.0 - i as f64)).collect()
    }

    #[test]
    fn it_stops_when_the_optimum_is_within_tolerance() {
        let criteria = StoppingCriteria::new(Cost::Finite(5.0));

        assert_eq!(
            criteria.evaluate(Cost::Finite(5.05), &[], 1.0),
            StopDecision::Stop(StopReason::OptimalFound)
        );
        assert_eq!(
            criteria.evaluate(Cost::Finite(5.2), &[], 1.0),
            StopDecision::Continue
        );
    }

    #[test]
    fn it_never_matches_an_unreachable_optimum() {
        let criteria = StoppingCriteria::new(Cost::Unreachable);

        assert_eq!(
            criteria.evaluate(Cost::Unreachable, &[], 1.0),
            StopDecision::Continue
        );
        assert_eq!(
            criteria.evaluate(Cost::Finite(3.0), &[], 1.0),
            StopDecision::Continue
        );
    }

    #[test]
    fn it_only_checks_stagnation_after_a_full_window() {
        let criteria = StoppingCriteria::new(Cost::Finite(1.0));
        let flat = vec![Cost::Finite(10.0); 19];

        assert_eq!(criteria.evaluate(Cost::Finite(9.0), &flat, 1.0), StopDecision::Continue);

        let flat = vec![Cost::Finite(10.0); 20];
        assert_eq!(
            criteria.evaluate(Cost::Finite(9.0), &flat, 1.0),
            StopDecision::Stop(StopReason::Stagnated)
        );
    }

    #[test]
    fn it_treats_a_new_minimum_as_stagnation_too() {
        let criteria = StoppingCriteria::new(Cost::Finite(1.0));

        // The latest value being the window minimum satisfies the rule
        assert_eq!(
            criteria.evaluate(Cost::Finite(50.0), &improving_history(25), 1.0),
            StopDecision::Stop(StopReason::Stagnated)
        );

        // A regression in the last generation does not
        let mut regressed = improving_history(25);
        regressed.push(Cost::Finite(200.0));
        assert_eq!(
            criteria.evaluate(Cost::Finite(50.0), &regressed, 1.0),
            StopDecision::Continue
        );
    }

    #[test]
    fn it_stops_on_collapsed_diversity() {
        let criteria = StoppingCriteria::new(Cost::Finite(1.0));

        assert_eq!(
            criteria.evaluate(Cost::Finite(9.0), &[], 0.005),
            StopDecision::Stop(StopReason::DiversityCollapsed)
        );
        assert_eq!(
            criteria.evaluate(Cost::Finite(9.0), &[], 0.01),
            StopDecision::Continue
        );
    }

    #[test]
    fn it_prefers_the_optimal_reason() {
        let criteria = StoppingCriteria::new(Cost::Finite(9.0));

        assert_eq!(
            criteria.evaluate(Cost::Finite(9.0), &vec![Cost::Finite(9.0); 20], 0.0),
            StopDecision::Stop(StopReason::OptimalFound)
        );
    }

    #[test]
    fn it_reads_termination_flags() {
        let flag = Arc::new(AtomicBool::new(false));
        let shared: Box<dyn Terminated> = Box::new(flag.clone());

        assert!(!shared.is_terminated());
        flag.store(true, Ordering::Relaxed);
        assert!(shared.is_terminated());
        assert!((&*flag).is_terminated());
    }
}
